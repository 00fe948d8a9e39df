use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::{ModelError, Opaque};

/// A workspace member or integration.
///
/// Objects returned without a `type` only carry the id.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawUser")]
pub enum User {
    Partial {
        id: Uuid,
    },
    Person {
        id: Uuid,
        name: Option<String>,
        avatar_url: Option<String>,
        email: Option<String>,
    },
    Bot {
        id: Uuid,
        name: Option<String>,
        avatar_url: Option<String>,
        bot: Opaque,
    },
}

impl User {
    pub fn id(&self) -> Uuid {
        match self {
            User::Partial { id } | User::Person { id, .. } | User::Bot { id, .. } => *id,
        }
    }
}

#[derive(Deserialize)]
struct RawUser {
    id: Uuid,
    #[serde(rename = "type")]
    kind: Option<String>,
    name: Option<String>,
    avatar_url: Option<String>,
    person: Option<PersonBody>,
    bot: Option<Value>,
}

#[derive(Deserialize)]
struct PersonBody {
    email: Option<String>,
}

impl TryFrom<RawUser> for User {
    type Error = ModelError;

    fn try_from(raw: RawUser) -> Result<Self, Self::Error> {
        let RawUser {
            id,
            kind,
            name,
            avatar_url,
            person,
            bot,
        } = raw;

        match kind.as_deref() {
            None => Ok(User::Partial { id }),
            Some("person") => Ok(User::Person {
                id,
                name,
                avatar_url,
                email: person.and_then(|p| p.email),
            }),
            Some("bot") => Ok(User::Bot {
                id,
                name,
                avatar_url,
                bot: Opaque(bot.unwrap_or_default()),
            }),
            Some(other) => Err(ModelError::UnknownUserType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const ID: &str = "6794760a-1f15-45cd-9c65-0dfe42f5135a";

    #[test]
    fn partial_user() {
        let user: User = serde_json::from_value(json!({ "object": "user", "id": ID })).unwrap();
        assert_eq!(user, User::Partial { id: Uuid::parse_str(ID).unwrap() });
    }

    #[test]
    fn person_user() {
        let user: User = serde_json::from_value(json!({
            "object": "user", "id": ID, "type": "person",
            "name": "Ada", "avatar_url": null,
            "person": { "email": "ada@example.com" }
        }))
        .unwrap();
        assert_eq!(
            user,
            User::Person {
                id: Uuid::parse_str(ID).unwrap(),
                name: Some("Ada".into()),
                avatar_url: None,
                email: Some("ada@example.com".into()),
            }
        );
    }

    #[test]
    fn bot_details_are_opaque() {
        let user: User = serde_json::from_value(json!({
            "id": ID, "type": "bot", "name": "Importer",
            "bot": { "owner": { "type": "workspace", "workspace": true } }
        }))
        .unwrap();
        match user {
            User::Bot { bot, .. } => assert_eq!(bot.0["owner"]["type"], "workspace"),
            other => panic!("expected bot, got {other:?}"),
        }
    }

    #[test]
    fn unknown_user_type_is_rejected() {
        let err = serde_json::from_value::<User>(json!({ "id": ID, "type": "alien" })).unwrap_err();
        assert!(err.to_string().contains("alien"));
    }
}
