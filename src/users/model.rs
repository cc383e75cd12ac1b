use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// One onboarding prompt with the user's answer. Order is preserved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prompt {
    pub question: String,
    pub answer: String,
}

/// Personality sliders, each on a 1..=10 scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sliders {
    pub social_battery: u8,
    pub texting_style: u8,
    pub planning_style: u8,
    pub humor: u8,
}

impl Sliders {
    pub fn validate(&self) -> Result<(), ApiError> {
        for (name, value) in [
            ("social_battery", self.social_battery),
            ("texting_style", self.texting_style),
            ("planning_style", self.planning_style),
            ("humor", self.humor),
        ] {
            if !(1..=10).contains(&value) {
                return Err(ApiError::Validation(format!(
                    "slider {name} must be between 1 and 10, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// How the account was created.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    Local,
    Google,
}

/// Everything a user tells us about themselves. Flattened into the
/// stored document and overwritten wholesale on Google re-onboarding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    pub age: u8,
    pub gender: String,
    pub aura_color: String,
    pub prompts: Vec<Prompt>,
    pub sliders: Sliders,
    #[serde(default)]
    pub bio_emojis: Option<String>,
    #[serde(default)]
    pub music_taste: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub red_flags: Option<String>,
    #[serde(default)]
    pub looking_for: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub blocked_users: Vec<String>,
}

impl Profile {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.username.trim().is_empty() {
            return Err(ApiError::Validation("username must not be empty".into()));
        }
        self.sliders.validate()
    }
}

/// User document as stored in the `users` collection.
///
/// No `skip_serializing` on the hash here: this struct is what the
/// driver writes to the store. Sanitization is an explicit conversion
/// into [`PublicUser`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub hashed_password: String,
    pub auth_provider: AuthProvider,
    pub created_at: DateTime,
    #[serde(flatten)]
    pub profile: Profile,
}

/// Client-safe view of a user: id normalized to a hex string, hash
/// stripped. The only user shape handlers are allowed to return.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: String,
    pub email: String,
    pub auth_provider: AuthProvider,
    #[serde(flatten)]
    pub profile: Profile,
}

impl From<UserRecord> for PublicUser {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            email: record.email,
            auth_provider: record.auth_provider,
            profile: record.profile,
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_profile() -> Profile {
    Profile {
        username: "MysteryGuest".into(),
        age: 24,
        gender: "F".into(),
        aura_color: "#7B1FA2".into(),
        prompts: vec![Prompt {
            question: "My toxic trait is...".into(),
            answer: "I steal hoodies.".into(),
        }],
        sliders: Sliders {
            social_battery: 3,
            texting_style: 8,
            planning_style: 5,
            humor: 10,
        },
        bio_emojis: Some("👽 🎧 🌙".into()),
        music_taste: Some("Indie Rock & 90s Hip Hop".into()),
        description: Some("Just here for the vibes.".into()),
        red_flags: Some("I put milk before cereal".into()),
        looking_for: vec!["Relationship".into()],
        tags: vec!["3AM Drives".into()],
        blocked_users: vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_profile_passes() {
        assert!(sample_profile().validate().is_ok());
    }

    #[test]
    fn slider_out_of_range_is_rejected() {
        let mut profile = sample_profile();
        profile.sliders.humor = 11;
        let err = profile.validate().unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(err.to_string().contains("humor"));
    }

    #[test]
    fn slider_zero_is_rejected() {
        let mut profile = sample_profile();
        profile.sliders.social_battery = 0;
        assert!(matches!(
            profile.validate(),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn empty_username_is_rejected() {
        let mut profile = sample_profile();
        profile.username = "  ".into();
        assert!(matches!(
            profile.validate(),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn public_user_never_serializes_the_hash() {
        let record = UserRecord {
            id: Some(ObjectId::new()),
            email: "spicy@example.com".into(),
            hashed_password: "$argon2id$v=19$whatever".into(),
            auth_provider: AuthProvider::Local,
            created_at: DateTime::now(),
            profile: sample_profile(),
        };
        let public = PublicUser::from(record);
        let json = serde_json::to_string(&public).unwrap();
        assert!(!json.contains("hashed_password"));
        assert!(!json.contains("argon2"));
        assert!(json.contains("spicy@example.com"));
    }

    #[test]
    fn public_user_id_is_hex_string() {
        let oid = ObjectId::new();
        let record = UserRecord {
            id: Some(oid),
            email: "a@b.co".into(),
            hashed_password: "h".into(),
            auth_provider: AuthProvider::Google,
            created_at: DateTime::now(),
            profile: sample_profile(),
        };
        assert_eq!(PublicUser::from(record).id, oid.to_hex());
    }
}
