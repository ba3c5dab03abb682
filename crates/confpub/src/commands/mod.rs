//! CLI command implementations.

pub(crate) mod convert;
pub(crate) mod publish;
pub(crate) mod versions;

pub(crate) use convert::ConvertArgs;
pub(crate) use publish::PublishArgs;
pub(crate) use versions::VersionsCommand;
