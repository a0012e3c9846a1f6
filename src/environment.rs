use crate::error::{LoxError, Result};
use crate::token::Token;
use crate::value::Value;
use log::trace;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared handle to a frame.  Blocks and calls own their frame for the
/// duration of execution; closures keep theirs alive afterwards.
pub type EnvRef = Rc<RefCell<Environment>>;

/// One lexical scope activation: a name → value map chained to its parent.
#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: EnvRef) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    /// Bind `name` in this frame, replacing any previous binding here.
    pub fn define(&mut self, name: &str, value: Value) {
        trace!("define {} = {}", name, value);
        self.values.insert(name.to_string(), value);
    }

    /// `true` if this frame itself (not a parent) binds `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Dynamic lookup: this frame, then each parent up to the root.
    pub fn get(&self, name: &Token) -> Result<Value> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(undefined(name))
        }
    }

    /// Dynamic assignment to the nearest frame that binds `name`.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<()> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(undefined(name))
        }
    }

    /// Walk exactly `distance` parent links from `env`.
    pub fn ancestor(env: &EnvRef, distance: usize) -> Option<EnvRef> {
        let mut current: EnvRef = Rc::clone(env);

        for _ in 0..distance {
            let parent: EnvRef = current.borrow().enclosing.clone()?;
            current = parent;
        }

        Some(current)
    }

    /// Read `name` from the frame `distance` hops up, with no name search.
    pub fn get_at(env: &EnvRef, distance: usize, name: &Token) -> Result<Value> {
        Self::ancestor(env, distance)
            .and_then(|frame| frame.borrow().values.get(&name.lexeme).cloned())
            .ok_or_else(|| undefined(name))
    }

    /// Write `name` in the frame `distance` hops up.
    pub fn assign_at(env: &EnvRef, distance: usize, name: &Token, value: Value) -> Result<()> {
        let frame: EnvRef = Self::ancestor(env, distance).ok_or_else(|| undefined(name))?;

        frame.borrow_mut().define(&name.lexeme, value);

        Ok(())
    }
}

fn undefined(name: &Token) -> LoxError {
    LoxError::runtime(name, format!("Undefined variable '{}'.", name.lexeme))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenType;

    fn ident(name: &str) -> Token {
        Token::new(TokenType::IDENTIFIER, name, 1)
    }

    #[test]
    fn get_walks_to_parent() {
        let global: EnvRef = Environment::new().into_ref();
        global.borrow_mut().define("a", Value::Number(1.0));

        let child = Environment::with_enclosing(Rc::clone(&global));

        assert_eq!(child.get(&ident("a")).unwrap(), Value::Number(1.0));
    }

    #[test]
    fn assign_updates_defining_frame() {
        let global: EnvRef = Environment::new().into_ref();
        global.borrow_mut().define("a", Value::Number(1.0));

        let child: EnvRef = Environment::with_enclosing(Rc::clone(&global)).into_ref();
        child
            .borrow_mut()
            .assign(&ident("a"), Value::Number(2.0))
            .unwrap();

        assert!(!child.borrow().contains("a"));
        assert_eq!(global.borrow().get(&ident("a")).unwrap(), Value::Number(2.0));
    }

    #[test]
    fn undefined_variable_is_runtime_error() {
        let env = Environment::new();
        let err = env.get(&ident("missing")).unwrap_err();

        assert!(err.is_runtime());
        assert_eq!(err.to_string(), "Undefined variable 'missing'.\n[line 1]");
    }

    #[test]
    fn get_at_skips_shadowing_frames() {
        let outer: EnvRef = Environment::new().into_ref();
        outer.borrow_mut().define("x", Value::Number(1.0));

        let inner: EnvRef = Environment::with_enclosing(Rc::clone(&outer)).into_ref();
        inner.borrow_mut().define("x", Value::Number(2.0));

        assert_eq!(
            Environment::get_at(&inner, 1, &ident("x")).unwrap(),
            Value::Number(1.0)
        );
        assert_eq!(
            Environment::get_at(&inner, 0, &ident("x")).unwrap(),
            Value::Number(2.0)
        );

        Environment::assign_at(&inner, 1, &ident("x"), Value::Nil).unwrap();
        assert_eq!(outer.borrow().get(&ident("x")).unwrap(), Value::Nil);
    }

    #[test]
    fn ancestor_past_root_is_none() {
        let root: EnvRef = Environment::new().into_ref();

        assert!(Environment::ancestor(&root, 1).is_none());
    }
}
