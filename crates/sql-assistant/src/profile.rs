//! User profile of the grocery variant and its projection into prompt fields.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Transport options offered at sign-up.
pub const TRANSPORT_OPTIONS: [&str; 4] = ["Walking", "Bus", "Car", "Bicycle"];

/// A single transport mode or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Transport {
    One(String),
    Many(Vec<String>),
}

impl Transport {
    /// Display form: list entries joined with `", "`, a single value verbatim.
    pub fn display(&self) -> String {
        match self {
            Transport::One(mode) => mode.clone(),
            Transport::Many(modes) => modes.join(", "),
        }
    }

    /// Storage form: comma-joined without spaces.
    pub fn to_stored(&self) -> String {
        match self {
            Transport::One(mode) => mode.clone(),
            Transport::Many(modes) => modes.join(","),
        }
    }

    /// Always yields a list; an empty column gives an empty list.
    pub fn from_stored(stored: &str) -> Self {
        if stored.is_empty() {
            return Transport::Many(Vec::new());
        }
        Transport::Many(stored.split(',').map(str::to_string).collect())
    }
}

impl Default for Transport {
    fn default() -> Self {
        Transport::Many(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct UserProfile {
    pub name: String,
    pub city: String,
    /// Free text such as "Bio" or allergies.
    pub preferences: String,
    #[serde(default)]
    pub transport: Transport,
    pub age: u32,
    /// Euro amount.
    pub budget: f64,
}

impl fmt::Display for UserProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{name: {:?}, city: {:?}, preferences: {:?}, transport: {:?}, age: {}, budget: {:?}}}",
            self.name,
            self.city,
            self.preferences,
            self.transport.display(),
            self.age,
            self.budget
        )
    }
}

/// Display strings derived from a profile for both prompt stages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileAttributes {
    pub name: String,
    /// Empty when the profile has no city; each template picks its own fallback.
    pub city: String,
    pub transport: String,
    pub preferences: String,
    pub budget: String,
    pub as_string: String,
}

impl ProfileAttributes {
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            name: profile.name.clone(),
            city: profile.city.clone(),
            transport: profile.transport.display(),
            preferences: profile.preferences.clone(),
            budget: format!("{:?}", profile.budget),
            as_string: profile.to_string(),
        }
    }

    pub fn city_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        or_fallback(&self.city, fallback)
    }

    pub fn name_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        or_fallback(&self.name, fallback)
    }

    pub fn transport_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        or_fallback(&self.transport, fallback)
    }

    pub fn preferences_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        or_fallback(&self.preferences, fallback)
    }
}

fn or_fallback<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}
