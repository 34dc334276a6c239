//! Connection credentials
//!
//! The connection string is plain concatenation:
//! `DRIVER={<driver>};SERVER=<server>;DATABASE=<database>;UID=<username>;PWD=<password>`.
//! No field is escaped, so a `;` or `}` inside a value changes how the
//! driver manager reads the string.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::{DriverError, DriverResult};

const MASK: &str = "****";

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub driver: String,
    pub server: String,
    pub database: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    pub fn new(
        driver: impl Into<String>,
        server: impl Into<String>,
        database: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            driver: driver.into(),
            server: server.into(),
            database: database.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Driver, server and database must be non-empty
    pub fn validate(&self) -> DriverResult<()> {
        let missing: Vec<&str> = [
            ("driver", &self.driver),
            ("server", &self.server),
            ("database", &self.database),
        ]
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| *name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(DriverError::ConnectionString(format!(
                "missing {}",
                missing.join(", ")
            )))
        }
    }

    pub fn connection_string(&self) -> DriverResult<String> {
        self.validate()?;
        Ok(self.render(&self.password))
    }

    /// Connection string with the password replaced, for logs
    pub fn masked_connection_string(&self) -> String {
        self.render(MASK)
    }

    fn render(&self, password: &str) -> String {
        format!(
            "DRIVER={{{}}};SERVER={};DATABASE={};UID={};PWD={}",
            self.driver, self.server, self.database, self.username, password
        )
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("driver", &self.driver)
            .field("server", &self.server)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &MASK)
            .finish()
    }
}
