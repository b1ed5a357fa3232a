//! Profile entity <-> model mapper

use chat_core::entities::Profile;
use chat_core::value_objects::Snowflake;

use crate::models::ProfileModel;

/// Convert ProfileModel to Profile entity
impl From<ProfileModel> for Profile {
    fn from(model: ProfileModel) -> Self {
        Profile {
            id: Snowflake::new(model.id),
            external_id: model.external_id,
            name: model.name,
            image_url: model.image_url,
            email: model.email,
            online: model.online,
            last_seen: model.last_seen,
            created_at: model.created_at,
        }
    }
}
