use chrono::{DateTime, Utc};
use mongodb::bson::DateTime as BsonDateTime;

pub fn chrono_to_bson(dt: DateTime<Utc>) -> BsonDateTime {
    BsonDateTime::from_millis(dt.timestamp_millis())
}

/// Creation timestamp for a stored quiz.
pub fn now_bson() -> BsonDateTime {
    chrono_to_bson(Utc::now())
}
