//! Bucket and scope handles
//!
//! Resolving these is purely local; names are only checked by the server
//! when a statement against them runs.

use crate::db::collection::Collection;
use crate::db::query::QueryService;

/// Name of the default scope and collection in every bucket
pub const DEFAULT_NAME: &str = "_default";

/// A named bucket reachable through a cluster session
pub struct Bucket<'a> {
    name: String,
    query: &'a QueryService,
}

impl<'a> Bucket<'a> {
    pub(crate) fn new(name: &str, query: &'a QueryService) -> Self {
        Self {
            name: name.to_string(),
            query,
        }
    }

    /// The bucket's default collection
    pub fn default_collection(&self) -> Collection<'a> {
        self.default_scope().collection(DEFAULT_NAME)
    }

    pub fn default_scope(&self) -> Scope<'a> {
        self.scope(DEFAULT_NAME)
    }

    pub fn scope(&self, name: &str) -> Scope<'a> {
        Scope {
            bucket: self.name.clone(),
            name: name.to_string(),
            query: self.query,
        }
    }
}

/// A scope within a bucket
pub struct Scope<'a> {
    bucket: String,
    name: String,
    query: &'a QueryService,
}

impl<'a> Scope<'a> {
    pub fn collection(&self, name: &str) -> Collection<'a> {
        let keyspace = keyspace(&self.bucket, &self.name, name);
        tracing::debug!(keyspace = %keyspace, "Resolved collection");
        Collection::new(keyspace, self.query)
    }
}

/// SQL++ keyspace path for a collection.
///
/// The default collection is addressed by the bare bucket name so that
/// clusters without collection support accept it too.
pub fn keyspace(bucket: &str, scope: &str, collection: &str) -> String {
    if scope == DEFAULT_NAME && collection == DEFAULT_NAME {
        escape_identifier(bucket)
    } else {
        format!(
            "{}.{}.{}",
            escape_identifier(bucket),
            escape_identifier(scope),
            escape_identifier(collection)
        )
    }
}

fn escape_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Client;

    #[test]
    fn test_default_collection_keyspace() {
        assert_eq!(
            keyspace("travel-sample", DEFAULT_NAME, DEFAULT_NAME),
            "`travel-sample`"
        );
    }

    #[test]
    fn test_named_collection_keyspace() {
        assert_eq!(
            keyspace("travel-sample", "inventory", "airline"),
            "`travel-sample`.`inventory`.`airline`"
        );
    }

    #[test]
    fn test_backticks_are_escaped() {
        assert_eq!(keyspace("we`ird", DEFAULT_NAME, DEFAULT_NAME), "`we``ird`");
    }

    #[test]
    fn test_bucket_resolves_collections_locally() {
        let query = QueryService::new(Client::new(), "http://127.0.0.1:1", "u", "p");
        let bucket = Bucket::new("travel-sample", &query);

        assert_eq!(bucket.default_collection().keyspace(), "`travel-sample`");
        assert_eq!(
            bucket.scope("inventory").collection("airline").keyspace(),
            "`travel-sample`.`inventory`.`airline`"
        );
    }
}
