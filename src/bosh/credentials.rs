use crate::error::Result;
use crate::traits::StringGenerator;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const USERNAME_LENGTH: usize = 7;
const PASSWORD_LENGTH: usize = 15;

/// Internal director component credentials, persisted as a flat string map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Credentials {
    pub mbus_username: String,
    pub mbus_password: String,
    pub nats_username: String,
    pub nats_password: String,
    pub postgres_username: String,
    pub postgres_password: String,
    pub registry_username: String,
    pub registry_password: String,
    pub blobstore_director_username: String,
    pub blobstore_director_password: String,
    pub blobstore_agent_username: String,
    pub blobstore_agent_password: String,
    pub hm_username: String,
    pub hm_password: String,
}

impl Credentials {
    /// Read previously stored credentials; unknown keys are ignored.
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self> {
        let value = serde_json::to_value(map)?;
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_map(&self) -> Result<BTreeMap<String, String>> {
        let value = serde_json::to_value(self)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Fill every empty field, keeping the ones already set
    pub fn fill_missing(mut self, strings: &dyn StringGenerator) -> Result<Self> {
        let slots: [(&mut String, &str, usize); 14] = [
            (&mut self.mbus_username, "mbus-user-", USERNAME_LENGTH),
            (&mut self.mbus_password, "mbus-", PASSWORD_LENGTH),
            (&mut self.nats_username, "nats-user-", USERNAME_LENGTH),
            (&mut self.nats_password, "nats-", PASSWORD_LENGTH),
            (&mut self.postgres_username, "postgres-user-", USERNAME_LENGTH),
            (&mut self.postgres_password, "postgres-", PASSWORD_LENGTH),
            (&mut self.registry_username, "registry-user-", USERNAME_LENGTH),
            (&mut self.registry_password, "registry-", PASSWORD_LENGTH),
            (&mut self.blobstore_director_username, "blobstore-director-user-", USERNAME_LENGTH),
            (&mut self.blobstore_director_password, "blobstore-director-", PASSWORD_LENGTH),
            (&mut self.blobstore_agent_username, "blobstore-agent-user-", USERNAME_LENGTH),
            (&mut self.blobstore_agent_password, "blobstore-agent-", PASSWORD_LENGTH),
            (&mut self.hm_username, "hm-user-", USERNAME_LENGTH),
            (&mut self.hm_password, "hm-", PASSWORD_LENGTH),
        ];

        for (slot, prefix, length) in slots {
            if slot.is_empty() {
                *slot = strings.generate(prefix, length)?;
            }
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::Credentials;
    use crate::testing::FakeStringGenerator;
    use std::collections::BTreeMap;

    #[test]
    fn fills_only_missing_fields() {
        let existing = Credentials {
            nats_password: "some-nats-password".to_string(),
            ..Credentials::default()
        };

        let filled = existing.fill_missing(&FakeStringGenerator::default()).unwrap();

        assert_eq!(filled.nats_password, "some-nats-password");
        assert_eq!(filled.nats_username, "nats-user-some-random-string");
        assert_eq!(filled.hm_password, "hm-some-random-string");
    }

    #[test]
    fn map_uses_camel_case_keys() {
        let credentials = Credentials {
            blobstore_agent_password: "some-password".to_string(),
            ..Credentials::default()
        };

        let map = credentials.to_map().unwrap();

        assert_eq!(map["blobstoreAgentPassword"], "some-password");
        assert_eq!(map.len(), 14);
    }

    #[test]
    fn reads_back_stored_map() {
        let mut map = BTreeMap::new();
        map.insert("mbusPassword".to_string(), "some-mbus-password".to_string());
        map.insert("somethingElse".to_string(), "ignored".to_string());

        let credentials = Credentials::from_map(&map).unwrap();

        assert_eq!(credentials.mbus_password, "some-mbus-password");
        assert!(credentials.nats_password.is_empty());
    }
}
