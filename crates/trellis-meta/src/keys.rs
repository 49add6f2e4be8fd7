//! Metadata key vocabulary.

/// The sentinel value the controller marker writes under
/// [`AttributeKey::Type`]. Extraction rejects subjects without it.
pub const CONTROLLER_TYPE_TAG: &str = "controller";

/// The member a metadata entry is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Member {
    /// The controller as a whole.
    Class,
    /// A named route method.
    Method(String),
}

impl Member {
    /// Creates a method member.
    #[must_use]
    pub fn method(name: impl Into<String>) -> Self {
        Self::Method(name.into())
    }
}

impl std::fmt::Display for Member {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Class => write!(f, "<class>"),
            Self::Method(name) => write!(f, "{name}"),
        }
    }
}

/// The attribute slot of a metadata entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKey {
    /// Class marker tag (`"controller"`).
    Type,
    /// Base URL the controller's router mounts under.
    BaseUrl,
    /// Route sub-path.
    Path,
    /// Route HTTP method selector.
    HttpMethod,
    /// Route handler reference.
    Handler,
    /// Ordered middleware list.
    Middlewares,
    /// Ordered error-middleware list.
    ErrorMiddlewares,
    /// Authentication strategy name.
    AuthStrategy,
    /// Required roles for the authentication requirement.
    AuthRoles,
    /// Request-body validation schema.
    RequestSchema,
    /// Request-body validation options.
    RequestSchemaOptions,
    /// Response schema with its flags.
    ResponseSchema,
    /// Positional index of the request-body argument.
    BodyIndex,
    /// Positional index of the path-parameters argument.
    ParamsIndex,
    /// Positional index of the query argument.
    QueryIndex,
    /// Positional index of the authenticated-user argument.
    AuthUserIndex,
}

impl std::fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Type => "type",
            Self::BaseUrl => "baseUrl",
            Self::Path => "path",
            Self::HttpMethod => "httpMethod",
            Self::Handler => "handler",
            Self::Middlewares => "middlewares",
            Self::ErrorMiddlewares => "errorMiddlewares",
            Self::AuthStrategy => "authStrategy",
            Self::AuthRoles => "authRoles",
            Self::RequestSchema => "requestSchema",
            Self::RequestSchemaOptions => "requestSchemaOptions",
            Self::ResponseSchema => "responseSchema",
            Self::BodyIndex => "bodyIndex",
            Self::ParamsIndex => "paramsIndex",
            Self::QueryIndex => "queryIndex",
            Self::AuthUserIndex => "authUserIndex",
        };
        write!(f, "{name}")
    }
}
