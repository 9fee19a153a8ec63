//! Engagement notifications delivered on the event feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::publish::{PostId, Visibility};

/// How another account engaged with one of our statuses.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EngagementKind {
	Favorited,
	Boosted,
}

/// The status an engagement points at.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusRef {
	pub id: PostId,
	pub visibility: Visibility,
}

/// One engagement notification.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Engagement {
	pub kind: EngagementKind,
	pub created_at: DateTime<Utc>,
	/// Handle of the engaging account, without the leading `@`.
	pub acct: String,
	pub status: StatusRef,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn engagement_parses_from_a_feed_line() {
		let line = r#"{
			"kind": "favorited",
			"createdAt": "2025-11-02T09:30:00Z",
			"acct": "ada@example.social",
			"status": { "id": "114", "visibility": "public" }
		}"#;

		let event: Engagement = serde_json::from_str(line).unwrap();
		assert_eq!(event.kind, EngagementKind::Favorited);
		assert_eq!(event.acct, "ada@example.social");
		assert_eq!(event.status.id, PostId("114".into()));
		assert_eq!(event.status.visibility, Visibility::Public);
	}

	#[test]
	fn unknown_kinds_are_rejected() {
		let line = r#"{
			"kind": "quoted",
			"createdAt": "2025-11-02T09:30:00Z",
			"acct": "ada@example.social",
			"status": { "id": "114", "visibility": "public" }
		}"#;

		assert!(serde_json::from_str::<Engagement>(line).is_err());
	}
}
