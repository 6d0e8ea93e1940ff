//! Evaluates lambda calculus expressions to closures under call-by-value
//! semantics with lexically captured environments.

use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;
use tracing::trace;

use crate::closure_impl::closure_ast::ExprNode;

/// Represents an evaluation error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EvalError {
    #[error("undefined variable: {0}")]
    UndefinedVariable(String),
}

/// Maps variable names to the closures they are bound to.
///
/// An environment is never changed once built. `extend` and `without` return
/// a new environment and leave the receiver alone, so a closure's captured
/// environment can't be altered by later evaluation.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    bindings: Rc<HashMap<String, Closure>>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Closure> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    /// Returns a copy of this environment with `name` bound to `value`,
    /// shadowing any existing binding.
    pub fn extend(&self, name: &str, value: Closure) -> Environment {
        let mut bindings = (*self.bindings).clone();
        bindings.insert(String::from(name), value);

        Environment {
            bindings: Rc::new(bindings),
        }
    }

    /// Returns a copy of this environment without a binding for `name`.
    pub fn without(&self, name: &str) -> Environment {
        self.without_all([name])
    }

    /// Returns a copy of this environment without bindings for any of `names`.
    pub fn without_all<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Environment {
        let names: Vec<&str> = names
            .into_iter()
            .filter(|name| self.contains(name))
            .collect();

        if names.is_empty() {
            return self.clone();
        }

        let mut bindings = (*self.bindings).clone();
        for name in names {
            bindings.remove(name);
        }

        Environment {
            bindings: Rc::new(bindings),
        }
    }

    /// Returns a copy of this environment keeping only the bindings for
    /// `names`. Names with no binding are ignored.
    pub fn restricted_to(&self, names: &[&str]) -> Environment {
        names
            .iter()
            .filter_map(|name| {
                self.get(name)
                    .map(|closure| (String::from(*name), closure.clone()))
            })
            .collect()
    }
}

impl FromIterator<(String, Closure)> for Environment {
    fn from_iter<T: IntoIterator<Item = (String, Closure)>>(iter: T) -> Self {
        Environment {
            bindings: Rc::new(iter.into_iter().collect()),
        }
    }
}

/// Two environments are equal when they bind the same names to equal
/// closures.
impl PartialEq for Environment {
    fn eq(&self, other: &Self) -> bool {
        if Rc::ptr_eq(&self.bindings, &other.bindings) {
            return true;
        }

        self.len() == other.len()
            && self
                .bindings
                .iter()
                .all(|(name, closure)| other.get(name) == Some(closure))
    }
}

/// The runtime value of the language: a lambda paired with the environment in
/// effect where the lambda was evaluated. The lambda's own parameter is never
/// bound in `env`.
#[derive(Debug, Clone)]
pub struct Closure {
    formal_param: String,
    fn_body: Rc<ExprNode>,
    env: Environment,
}

impl Closure {
    pub fn new(formal_param: &str, fn_body: Rc<ExprNode>, env: Environment) -> Self {
        Closure {
            formal_param: String::from(formal_param),
            fn_body,
            env,
        }
    }

    pub fn formal_param(&self) -> &str {
        self.formal_param.as_str()
    }

    pub fn fn_body(&self) -> &ExprNode {
        &self.fn_body
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// The lambda node this closure was created from.
    pub fn lambda(&self) -> ExprNode {
        ExprNode::FnDef {
            formal_param: self.formal_param.clone(),
            fn_body: Rc::clone(&self.fn_body),
        }
    }
}

/// Closures are equal when their lambdas are structurally equal and their
/// captured environments agree on every name. Bound variables are not renamed,
/// so `(\x.x)` and `(\y.y)` differ.
impl PartialEq for Closure {
    fn eq(&self, other: &Self) -> bool {
        self.formal_param == other.formal_param
            && (Rc::ptr_eq(&self.fn_body, &other.fn_body) || self.fn_body == other.fn_body)
            && self.env == other.env
    }
}

/// Applies `fn_value` to `arg_value`: evaluates the function body under the
/// captured environment extended with the parameter binding. The extension is
/// local to this call.
pub fn apply_closure(fn_value: &Closure, arg_value: Closure) -> Result<Closure, EvalError> {
    trace!(formal_param = fn_value.formal_param(), "applying closure");

    let call_env = fn_value.env.extend(&fn_value.formal_param, arg_value);
    eval_expr(&fn_value.fn_body, &call_env)
}

/// Evaluates an expression to a closure. Application evaluates the function
/// position, then the argument, then the body. Divergent terms recurse
/// without bound.
pub fn eval_expr(expr_node: &ExprNode, env: &Environment) -> Result<Closure, EvalError> {
    match expr_node {
        ExprNode::Var { var_name } => env
            .get(var_name)
            .cloned()
            .ok_or_else(|| EvalError::UndefinedVariable(var_name.clone())),

        ExprNode::FnDef {
            formal_param,
            fn_body,
        } => Ok(Closure::new(formal_param, Rc::clone(fn_body), env.clone())),

        ExprNode::FnApp {
            fn_body,
            actual_arg,
        } => {
            let fn_value = eval_expr(fn_body, env)?;
            let arg_value = eval_expr(actual_arg, env)?;
            apply_closure(&fn_value, arg_value)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::closure_impl::closure_recursive_descent_parsing::parse_recursive_descent;
    use crate::lexical_analysis::run_lexical_analysis;

    use super::*;

    fn parse_str(program_str: &str) -> ExprNode {
        let program_tokens =
            run_lexical_analysis(program_str, true).expect("Unable to lex program string.");
        parse_recursive_descent(&program_tokens).expect("Unable to parse program string.")
    }

    fn eval_str(program_str: &str, env: &Environment) -> Result<Closure, EvalError> {
        eval_expr(&parse_str(program_str), env)
    }

    fn builtins() -> Environment {
        let identity = eval_str(r"(\x.x)", &Environment::new()).expect("identity failed");
        let zero = eval_str(r"(\f.(\x.x))", &Environment::new()).expect("zero failed");

        Environment::new()
            .extend("identity", identity)
            .extend("zero", zero)
    }

    #[test]
    fn test_lambda_captures_environment() {
        let env = builtins();
        let closure = eval_str(r"(\y.zero)", &env).expect("Evaluation failed.");

        assert_eq!(closure.formal_param(), "y");
        assert_eq!(closure.fn_body(), &ExprNode::var("zero"));
        assert_eq!(closure.env(), &env);
        assert_eq!(closure.lambda(), parse_str(r"(\y.zero)"));
    }

    #[test]
    fn test_variable_lookup_returns_bound_closure() {
        let env = builtins();
        let closure = eval_str("zero", &env).expect("Evaluation failed.");

        assert_eq!(Some(&closure), env.get("zero"));
    }

    #[test]
    fn test_undefined_variable() {
        let eval_error = eval_str("x", &Environment::new()).expect_err("x should be unbound.");

        assert_eq!(eval_error, EvalError::UndefinedVariable(String::from("x")));
        assert_eq!(eval_error.to_string(), "undefined variable: x");
    }

    #[test]
    fn test_unbound_variable_in_argument_position() {
        let eval_error =
            eval_str(r"((\x.x) missing)", &builtins()).expect_err("missing should be unbound.");

        assert_eq!(eval_error.to_string(), "undefined variable: missing");
    }

    // Unused lambda bodies are never evaluated.
    #[test]
    fn test_body_evaluated_only_on_application() {
        assert!(eval_str(r"(\x.unbound)", &Environment::new()).is_ok());
        assert!(eval_str(r"((\x.unbound) (\y.y))", &Environment::new()).is_err());
    }

    #[test]
    fn test_application_binds_parameter() {
        let env = builtins();
        let closure = eval_str(r"(identity zero)", &env).expect("Evaluation failed.");

        assert_eq!(Some(&closure), env.get("zero"));
    }

    #[test]
    fn test_inner_lambda_keeps_outer_capture() {
        let env = builtins();
        let constant = eval_str(r"((\x.(\y.x)) zero)", &env).expect("Evaluation failed.");
        let identity = env.get("identity").expect("identity missing").clone();

        let result = apply_closure(&constant, identity).expect("Application failed.");

        assert_eq!(Some(&result), env.get("zero"));
        assert!(!constant.env().contains("y"));
    }

    #[test]
    fn test_application_does_not_mutate_function_env() {
        let env = builtins();
        let constant = eval_str(r"(\x.(\y.x))", &env).expect("Evaluation failed.");
        let zero = env.get("zero").expect("zero missing").clone();

        apply_closure(&constant, zero).expect("Application failed.");

        assert!(!constant.env().contains("x"));
        assert_eq!(constant.env(), &env);
    }

    #[test]
    fn test_copy_on_write_environment() {
        let env = builtins();
        let extended = env.extend("other", env.get("zero").expect("zero missing").clone());
        let narrowed = env.without("zero");

        assert_eq!(env.len(), 2);
        assert_eq!(extended.len(), 3);
        assert_eq!(narrowed.len(), 1);
        assert!(env.contains("zero"));
        assert!(!narrowed.contains("zero"));
        assert_eq!(env.without("not-bound"), env);

        let restricted = env.restricted_to(&["zero", "absent"]);
        let mut names: Vec<&str> = restricted.names().collect();
        names.sort();
        assert_eq!(names, vec!["zero"]);
    }

    #[test]
    fn test_closure_equality_is_structural() {
        let empty = Environment::new();
        let identity_x = eval_str(r"(\x.x)", &empty).expect("Evaluation failed.");
        let identity_x_again = eval_str(r"(\x.x)", &empty).expect("Evaluation failed.");
        let identity_y = eval_str(r"(\y.y)", &empty).expect("Evaluation failed.");

        assert_eq!(identity_x, identity_x_again);
        assert_ne!(identity_x, identity_y);
    }

    // A name bound on only one side makes closures unequal.
    #[test]
    fn test_closure_equality_compares_environments() {
        let env = builtins();
        let bare = eval_str(r"(\x.x)", &Environment::new()).expect("Evaluation failed.");
        let captured = eval_str(r"(\x.x)", &env).expect("Evaluation failed.");
        let captured_again = eval_str(r"(\x.x)", &builtins()).expect("Evaluation failed.");
        let swapped = eval_str(
            r"(\x.x)",
            &env.extend("zero", env.get("identity").expect("identity missing").clone()),
        )
        .expect("Evaluation failed.");

        assert_ne!(bare, captured);
        assert_ne!(captured, bare);
        assert_eq!(captured, captured_again);
        assert_ne!(captured, swapped);
    }

    #[test]
    fn test_church_successor() {
        let env = builtins();
        let add1 = eval_str(r"(\n.(\f.(\x.(f ((n f) x)))))", &env).expect("Evaluation failed.");
        let env = env.extend("add1", add1);

        let one = eval_str(r"(add1 zero)", &env).expect("Evaluation failed.");
        let expected = eval_str(r"((\n.(\f.(\x.(f ((n f) x))))) zero)", &builtins())
            .expect("Evaluation failed.");

        assert_eq!(one.formal_param(), "f");
        assert_eq!(one.env().get("n"), env.get("zero"));
        assert_eq!(one, expected);
    }
}
