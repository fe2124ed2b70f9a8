use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

use crate::types::TypeInfo;

/// The identity used to request a dependency.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    /// An injectable class, identified by its type
    Class(TypeInfo),
    /// An opaque injection-token object
    Injection(InjectionToken),
    /// A literal value used as a token
    Literal(String),
}

impl Token {
    pub fn of<T: 'static + ?Sized>() -> Token {
        Token::Class(TypeInfo::of::<T>())
    }

    pub fn literal(value: impl Into<String>) -> Token {
        Token::Literal(value.into())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Class(info) => f.write_str(info.type_name),
            Token::Injection(token) => write!(f, "InjectionToken {}", token.description()),
            Token::Literal(value) => f.write_str(value),
        }
    }
}

impl From<TypeInfo> for Token {
    fn from(info: TypeInfo) -> Self {
        Token::Class(info)
    }
}
impl From<InjectionToken> for Token {
    fn from(token: InjectionToken) -> Self {
        Token::Injection(token)
    }
}
impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Token::Literal(value.to_string())
    }
}
impl From<String> for Token {
    fn from(value: String) -> Self {
        Token::Literal(value)
    }
}

/// An opaque token with reference identity: clones are the same token,
/// while two `new` calls with the same description are distinct tokens.
#[derive(Clone, Debug)]
pub struct InjectionToken {
    desc: Arc<String>,
}

impl InjectionToken {
    pub fn new(desc: impl Into<String>) -> Self {
        InjectionToken {
            desc: Arc::new(desc.into()),
        }
    }

    pub fn description(&self) -> &str {
        &self.desc
    }
}

impl PartialEq for InjectionToken {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.desc, &other.desc)
    }
}
impl Eq for InjectionToken {}
impl Hash for InjectionToken {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.desc) as usize).hash(state);
    }
}

/// A token reference that may defer resolution until lookup time,
/// breaking declaration-order cycles between mutually dependent types.
#[derive(Clone)]
pub enum TokenRef {
    Concrete(Token),
    Forward(Arc<dyn Fn() -> Token + Send + Sync>),
}

impl TokenRef {
    pub fn forward(supplier: impl Fn() -> Token + Send + Sync + 'static) -> Self {
        TokenRef::Forward(Arc::new(supplier))
    }
}

impl fmt::Debug for TokenRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenRef::Concrete(token) => f.debug_tuple("Concrete").field(token).finish(),
            TokenRef::Forward(_) => f.write_str("Forward(<deferred>)"),
        }
    }
}

impl From<Token> for TokenRef {
    fn from(token: Token) -> Self {
        TokenRef::Concrete(token)
    }
}
impl From<TypeInfo> for TokenRef {
    fn from(info: TypeInfo) -> Self {
        TokenRef::Concrete(Token::Class(info))
    }
}
impl From<InjectionToken> for TokenRef {
    fn from(token: InjectionToken) -> Self {
        TokenRef::Concrete(Token::Injection(token))
    }
}

/// Passes concrete tokens through unchanged and invokes deferred
/// suppliers.
pub fn resolve_forward_ref(token: &TokenRef) -> Token {
    match token {
        TokenRef::Concrete(token) => token.clone(),
        TokenRef::Forward(supplier) => supplier(),
    }
}
