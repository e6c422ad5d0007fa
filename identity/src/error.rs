use snafu::Snafu;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("An OIDC provider needs at least one audience"))]
    EmptyAudienceList,

    #[snafu(display("The OIDC issuer host may not be empty"))]
    EmptyIssuerHost,

    #[snafu(display(
        "An OIDC provider cannot be registered with an empty thumbprint list: cloud identity \
         verification cannot be skipped"
    ))]
    EmptyThumbprintList,

    #[snafu(display("Error declaring node for '{}': {}", what, source))]
    Graph {
        what: String,
        source: nodeplane_model::Error,
    },

    #[snafu(display("Invalid cluster name '{}': {}", cluster_name, source))]
    InvalidClusterName {
        cluster_name: String,
        source: nodeplane_model::Error,
    },

    #[snafu(display("The OIDC issuer host '{}' does not form a valid URL: {}", host, source))]
    InvalidIssuerHost {
        host: String,
        source: url::ParseError,
    },

    #[snafu(display("Invalid service account identity '{}': {}", identity, reason))]
    InvalidServiceAccount { identity: String, reason: String },

    #[snafu(display(
        "Malformed account ARN prefix '{}': expected the form 'arn:<partition>:iam::<account-id>'",
        prefix
    ))]
    MalformedArnPrefix { prefix: String },

    #[snafu(display("Error serializing trust policy for '{}': {}", what, source))]
    PolicySerialization {
        what: String,
        source: serde_json::Error,
    },

    #[snafu(display(
        "The OIDC issuer host '{}' must not include a scheme; the protocol-qualified URL is \
         derived, never configured",
        host
    ))]
    SchemeInIssuerHost { host: String },

    #[snafu(display(
        "A federated trust policy binds exactly one service account subject, but {} were supplied",
        count
    ))]
    SubjectCount { count: usize },

    #[snafu(display(
        "The service account '{}' must be declared as a node before a role can federate to it",
        subject
    ))]
    UndeclaredServiceAccount { subject: String },
}
