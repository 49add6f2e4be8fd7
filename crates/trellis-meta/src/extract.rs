//! Descriptor extraction.
//!
//! Reads a registered subject's metadata into typed descriptors. Members
//! without a recognized HTTP-method tag are silently skipped — this is the
//! mechanism distinguishing route declarations from anything else written
//! into the store. Malformed metadata aborts the controller's registration
//! with a descriptive error; nothing is retried.

use crate::descriptor::{
    AuthRequirement, ControllerDescriptor, ParamBindings, RouteDescriptor, SchemaRef,
};
use crate::keys::{AttributeKey, Member, CONTROLLER_TYPE_TAG};
use crate::store::{MetadataStore, SubjectId};
use crate::value::MetaValue;
use thiserror::Error;

/// Configuration errors raised while reading controller metadata.
///
/// All of these are fatal at registration time.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The subject id is not registered in the store.
    #[error("unknown controller subject")]
    UnknownSubject,

    /// The subject lacks the controller marker.
    #[error("type '{subject}' is not marked as a controller")]
    NotAController {
        /// Subject display name.
        subject: String,
    },

    /// An attribute exists but holds the wrong kind of value, or a required
    /// attribute is missing.
    #[error("controller '{subject}', member '{member}': malformed metadata for '{attribute}'")]
    Malformed {
        /// Subject display name.
        subject: String,
        /// Offending member.
        member: String,
        /// Offending attribute.
        attribute: String,
    },

    /// Two parameter sources bind the same positional index.
    #[error(
        "controller '{subject}', member '{member}': two parameter sources bind index {index}"
    )]
    DuplicateParameterIndex {
        /// Subject display name.
        subject: String,
        /// Offending member.
        member: String,
        /// The shared index.
        index: usize,
    },
}

fn subject_name(store: &MetadataStore, subject: SubjectId) -> String {
    store
        .subject_name(subject)
        .unwrap_or("<unknown>")
        .to_string()
}

fn malformed(store: &MetadataStore, subject: SubjectId, member: &Member, key: AttributeKey) -> MetadataError {
    MetadataError::Malformed {
        subject: subject_name(store, subject),
        member: member.to_string(),
        attribute: key.to_string(),
    }
}

/// Reads the class-level descriptor of a registered controller.
///
/// The subject must carry the `"controller"` type tag; base URL defaults to
/// `""`, middleware lists default to empty, and an empty strategy name means
/// no authentication requirement.
pub fn extract_controller_descriptor(
    store: &MetadataStore,
    subject: SubjectId,
) -> Result<ControllerDescriptor, MetadataError> {
    if !store.contains_subject(subject) {
        return Err(MetadataError::UnknownSubject);
    }

    let class = Member::Class;
    let tag = store
        .get(subject, &class, AttributeKey::Type)
        .and_then(MetaValue::as_str);
    if tag != Some(CONTROLLER_TYPE_TAG) {
        return Err(MetadataError::NotAController {
            subject: subject_name(store, subject),
        });
    }

    let base_url = store
        .get(subject, &class, AttributeKey::BaseUrl)
        .and_then(MetaValue::as_str)
        .unwrap_or("")
        .to_string();

    let middlewares = store
        .get(subject, &class, AttributeKey::Middlewares)
        .and_then(MetaValue::as_middlewares)
        .map(<[_]>::to_vec)
        .unwrap_or_default();

    let error_middlewares = store
        .get(subject, &class, AttributeKey::ErrorMiddlewares)
        .and_then(MetaValue::as_error_stages)
        .map(<[_]>::to_vec)
        .unwrap_or_default();

    Ok(ControllerDescriptor {
        base_url,
        middlewares,
        error_middlewares,
        auth: extract_auth(store, subject, &class),
        validation: extract_validation(store, subject, &class),
    })
}

/// Reads the route descriptors of a registered controller, in declaration
/// order.
pub fn extract_route_descriptors(
    store: &MetadataStore,
    subject: SubjectId,
) -> Result<Vec<RouteDescriptor>, MetadataError> {
    if !store.contains_subject(subject) {
        return Err(MetadataError::UnknownSubject);
    }

    let mut routes = Vec::new();

    let members: Vec<Member> = store.method_members(subject).cloned().collect();
    for member in members {
        // Only members carrying a recognized HTTP-method tag are routes;
        // everything else is skipped without comment.
        let Some(method) = store
            .get(subject, &member, AttributeKey::HttpMethod)
            .and_then(MetaValue::as_http_method)
            .cloned()
        else {
            continue;
        };

        let path = store
            .get(subject, &member, AttributeKey::Path)
            .and_then(MetaValue::as_str)
            .ok_or_else(|| malformed(store, subject, &member, AttributeKey::Path))?
            .to_string();

        let handler = store
            .get(subject, &member, AttributeKey::Handler)
            .and_then(MetaValue::as_handler)
            .ok_or_else(|| malformed(store, subject, &member, AttributeKey::Handler))?;

        let middlewares = store
            .get(subject, &member, AttributeKey::Middlewares)
            .and_then(MetaValue::as_middlewares)
            .map(<[_]>::to_vec)
            .unwrap_or_default();

        let error_middlewares = store
            .get(subject, &member, AttributeKey::ErrorMiddlewares)
            .and_then(MetaValue::as_error_stages)
            .map(<[_]>::to_vec)
            .unwrap_or_default();

        let response_schema = store
            .get(subject, &member, AttributeKey::ResponseSchema)
            .and_then(MetaValue::as_response_schema)
            .cloned();

        let bindings = ParamBindings {
            body: read_index(store, subject, &member, AttributeKey::BodyIndex),
            params: read_index(store, subject, &member, AttributeKey::ParamsIndex),
            query: read_index(store, subject, &member, AttributeKey::QueryIndex),
            auth_user: read_index(store, subject, &member, AttributeKey::AuthUserIndex),
        };
        if let Some(index) = bindings.duplicate_index() {
            return Err(MetadataError::DuplicateParameterIndex {
                subject: subject_name(store, subject),
                member: member.to_string(),
                index,
            });
        }

        routes.push(RouteDescriptor {
            member: member.to_string(),
            path,
            method,
            handler,
            middlewares,
            error_middlewares,
            auth: extract_auth(store, subject, &member),
            validation: extract_validation(store, subject, &member),
            response_schema,
            bindings,
        });
    }

    Ok(routes)
}

fn extract_auth(
    store: &MetadataStore,
    subject: SubjectId,
    member: &Member,
) -> Option<AuthRequirement> {
    let strategy = store
        .get(subject, member, AttributeKey::AuthStrategy)
        .and_then(MetaValue::as_str)?;
    if strategy.is_empty() {
        return None;
    }
    let roles = store
        .get(subject, member, AttributeKey::AuthRoles)
        .and_then(MetaValue::as_roles)
        .map(<[_]>::to_vec)
        .unwrap_or_default();
    Some(AuthRequirement {
        strategy: strategy.to_string(),
        roles,
    })
}

fn extract_validation(
    store: &MetadataStore,
    subject: SubjectId,
    member: &Member,
) -> Option<SchemaRef> {
    let schema = store
        .get(subject, member, AttributeKey::RequestSchema)
        .and_then(MetaValue::as_schema)?;
    let options = store
        .get(subject, member, AttributeKey::RequestSchemaOptions)
        .and_then(MetaValue::as_options);
    Some(SchemaRef { schema, options })
}

fn read_index(
    store: &MetadataStore,
    subject: SubjectId,
    member: &Member,
    key: AttributeKey,
) -> Option<usize> {
    store.get(subject, member, key).and_then(MetaValue::as_index)
}
