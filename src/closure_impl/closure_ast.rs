/// Data structures to represent lambda calculus expressions, and the utility
/// functions to display them.
use std::rc::Rc;

/// Represents a lambda-calculus expression. Equality is structural: bound
/// variable names must match exactly.
///
/// Function bodies sit behind an `Rc` so closures can share them with the
/// tree they were evaluated from.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ExprNode {
    FnDef {
        formal_param: String,
        fn_body: Rc<ExprNode>,
    },
    FnApp {
        fn_body: Box<ExprNode>,
        actual_arg: Box<ExprNode>,
    },
    Var {
        var_name: String,
    },
}

impl ExprNode {
    pub fn var(var_name: &str) -> Self {
        ExprNode::Var {
            var_name: String::from(var_name),
        }
    }

    pub fn fn_def(formal_param: &str, fn_body: ExprNode) -> Self {
        ExprNode::FnDef {
            formal_param: String::from(formal_param),
            fn_body: Rc::new(fn_body),
        }
    }

    pub fn fn_app(fn_body: ExprNode, actual_arg: ExprNode) -> Self {
        ExprNode::FnApp {
            fn_body: Box::new(fn_body),
            actual_arg: Box::new(actual_arg),
        }
    }
}

// Helper function to produce the canonical surface syntax of an ExprNode.
// Every abstraction and application is fully parenthesized.
fn expr_node_to_string_helper(expr_node: &ExprNode, string_so_far: &mut String) {
    match expr_node {
        ExprNode::Var { var_name } => {
            string_so_far.push_str(var_name.as_str());
        }
        ExprNode::FnApp {
            fn_body,
            actual_arg,
        } => {
            string_so_far.push('(');
            expr_node_to_string_helper(fn_body, string_so_far);
            string_so_far.push(' ');
            expr_node_to_string_helper(actual_arg, string_so_far);
            string_so_far.push(')');
        }
        ExprNode::FnDef {
            formal_param,
            fn_body,
        } => {
            string_so_far.push_str("(\\");
            string_so_far.push_str(formal_param.as_str());
            string_so_far.push('.');
            expr_node_to_string_helper(fn_body, string_so_far);
            string_so_far.push(')');
        }
    };
}

// Converts an expr node to a string.
pub fn expr_node_to_string(expr_node: &ExprNode) -> String {
    let mut out_string = String::new();
    expr_node_to_string_helper(expr_node, &mut out_string);
    out_string
}

impl std::fmt::Display for ExprNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", expr_node_to_string(self))
    }
}
