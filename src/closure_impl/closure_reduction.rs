//! Symbolic reduction used to display closures: variables bound in a closure's
//! environment are inlined as the lambdas they stand for, except for names the
//! caller asks to keep symbolic.

use std::collections::HashSet;
use std::fmt::Display;
use std::rc::Rc;

use crate::closure_impl::closure_ast::ExprNode;
use crate::closure_impl::closure_execution::{Closure, Environment};

// Rebuilds a lambda with its body reduced. The parameter shadows any binding
// of the same name inside the body.
fn reduce_fn_def(
    formal_param: &str,
    fn_body: &ExprNode,
    env: &Environment,
    excluded: &HashSet<&str>,
) -> ExprNode {
    ExprNode::FnDef {
        formal_param: String::from(formal_param),
        fn_body: Rc::new(reduce_expr(fn_body, &env.without(formal_param), excluded)),
    }
}

// Expands a closure into its lambda, resolving the lambda's free variables
// against the closure's own captured environment.
fn reduce_closure(closure: &Closure, excluded: &HashSet<&str>) -> ExprNode {
    let working_env = closure.env().without_all(excluded.iter().copied());

    reduce_fn_def(
        closure.formal_param(),
        closure.fn_body(),
        &working_env,
        excluded,
    )
}

/// Rewrites `expr_node`, replacing every variable bound in `env` by the
/// reduced lambda of its closure. Unbound variables are left as they are.
pub fn reduce_expr(expr_node: &ExprNode, env: &Environment, excluded: &HashSet<&str>) -> ExprNode {
    match expr_node {
        ExprNode::Var { var_name } => match env.get(var_name) {
            Some(closure) => reduce_closure(closure, excluded),
            None => expr_node.clone(),
        },

        ExprNode::FnDef {
            formal_param,
            fn_body,
        } => reduce_fn_def(formal_param, fn_body, env, excluded),

        ExprNode::FnApp {
            fn_body,
            actual_arg,
        } => ExprNode::fn_app(
            reduce_expr(fn_body, env, excluded),
            reduce_expr(actual_arg, env, excluded),
        ),
    }
}

impl Closure {
    /// Renders this closure in surface syntax with its environment inlined.
    /// References to any name in `excluded` (typically the builtins in scope)
    /// stay symbolic.
    pub fn render(&self, excluded: &[&str]) -> String {
        let excluded: HashSet<&str> = excluded.iter().copied().collect();
        reduce_closure(self, &excluded).to_string()
    }
}

impl Display for Closure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render(&[]))
    }
}
