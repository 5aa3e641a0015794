//! Mail folders and folder-reference resolution.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Kind of mail folder.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderType {
    Inbox,
    Sent,
    Drafts,
    Spam,
    Trash,
    Custom,
}

impl FolderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FolderType::Inbox => "inbox",
            FolderType::Sent => "sent",
            FolderType::Drafts => "drafts",
            FolderType::Spam => "spam",
            FolderType::Trash => "trash",
            FolderType::Custom => "custom",
        }
    }
}

impl core::fmt::Display for FolderType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FolderType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inbox" => Ok(FolderType::Inbox),
            "sent" => Ok(FolderType::Sent),
            "drafts" => Ok(FolderType::Drafts),
            "spam" => Ok(FolderType::Spam),
            "trash" => Ok(FolderType::Trash),
            "custom" => Ok(FolderType::Custom),
            other => Err(CoreError::validation(format!("unknown folder type '{other}'"))),
        }
    }
}

/// A user's folder as reported by the messages service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub folder_id: String,
    pub folder_name: String,
    pub folder_type: FolderType,
}

/// Resolve a caller-supplied folder reference to a folder ID.
///
/// `target` may be an ID, a display name or a type tag. Rules are applied in
/// strict precedence over the whole list: exact ID, then exact name, then exact
/// type tag. Matching is case-sensitive.
///
/// `None` means "not found" and must be surfaced to the client as such, never
/// replaced by a default folder. An empty target never matches.
pub fn resolve_folder_id<'a>(folders: &'a [Folder], target: &str) -> Option<&'a str> {
    if target.is_empty() {
        return None;
    }

    folders
        .iter()
        .find(|f| f.folder_id == target)
        .or_else(|| folders.iter().find(|f| f.folder_name == target))
        .or_else(|| folders.iter().find(|f| f.folder_type.as_str() == target))
        .map(|f| f.folder_id.as_str())
        .filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn folder(id: &str, name: &str, kind: FolderType) -> Folder {
        Folder {
            folder_id: id.to_string(),
            folder_name: name.to_string(),
            folder_type: kind,
        }
    }

    fn mailbox() -> Vec<Folder> {
        vec![
            folder("f-1", "Inbox", FolderType::Inbox),
            folder("f-2", "Sent", FolderType::Sent),
            folder("f-3", "Spam", FolderType::Spam),
            folder("f-4", "Work", FolderType::Custom),
        ]
    }

    #[test]
    fn resolves_by_id_name_and_type() {
        let folders = mailbox();
        assert_eq!(resolve_folder_id(&folders, "f-4"), Some("f-4"));
        assert_eq!(resolve_folder_id(&folders, "Work"), Some("f-4"));
        assert_eq!(resolve_folder_id(&folders, "spam"), Some("f-3"));
    }

    #[test]
    fn empty_target_or_no_match_is_not_found() {
        let folders = mailbox();
        assert_eq!(resolve_folder_id(&folders, ""), None);
        assert_eq!(resolve_folder_id(&folders, "Personal"), None);
        assert_eq!(resolve_folder_id(&[], "inbox"), None);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let folders = mailbox();
        assert_eq!(resolve_folder_id(&folders, "work"), None);
        assert_eq!(resolve_folder_id(&folders, "INBOX"), None);
        // "Inbox" is a name, "inbox" a type tag; both hit f-1 through different rules.
        assert_eq!(resolve_folder_id(&folders, "Inbox"), Some("f-1"));
        assert_eq!(resolve_folder_id(&folders, "inbox"), Some("f-1"));
    }

    #[test]
    fn id_beats_name_beats_type_across_the_whole_list() {
        let folders = vec![
            folder("custom", "Receipts", FolderType::Custom),
            folder("f-9", "custom", FolderType::Custom),
            folder("f-10", "Archive", FolderType::Custom),
        ];
        // ID match wins even though a name and a type also equal "custom".
        assert_eq!(resolve_folder_id(&folders, "custom"), Some("custom"));

        let folders = vec![
            folder("f-1", "Inbox", FolderType::Spam),
            folder("f-2", "spam", FolderType::Custom),
        ];
        // Name match later in the list beats a type match earlier in the list.
        assert_eq!(resolve_folder_id(&folders, "spam"), Some("f-2"));
    }

    #[test]
    fn folder_with_empty_id_is_not_found() {
        let folders = vec![folder("", "Ghost", FolderType::Custom)];
        assert_eq!(resolve_folder_id(&folders, "Ghost"), None);
    }

    #[test]
    fn folder_type_round_trips_through_str() {
        for t in [
            FolderType::Inbox,
            FolderType::Sent,
            FolderType::Drafts,
            FolderType::Spam,
            FolderType::Trash,
            FolderType::Custom,
        ] {
            assert_eq!(t.as_str().parse::<FolderType>().unwrap(), t);
        }
        assert!("Inbox".parse::<FolderType>().is_err());
    }

    fn arb_folder() -> impl Strategy<Value = Folder> {
        (
            "[a-z0-9-]{1,6}",
            "[A-Za-z]{1,6}",
            prop::sample::select(vec![
                FolderType::Inbox,
                FolderType::Sent,
                FolderType::Spam,
                FolderType::Custom,
            ]),
        )
            .prop_map(|(id, name, kind)| Folder {
                folder_id: id,
                folder_name: name,
                folder_type: kind,
            })
    }

    proptest! {
        #[test]
        fn resolution_follows_precedence(
            folders in prop::collection::vec(arb_folder(), 0..8),
            target in "[A-Za-z0-9-]{0,6}",
        ) {
            let expected = if target.is_empty() {
                None
            } else {
                folders.iter().find(|f| f.folder_id == target)
                    .or_else(|| folders.iter().find(|f| f.folder_name == target))
                    .or_else(|| folders.iter().find(|f| f.folder_type.as_str() == target))
                    .map(|f| f.folder_id.as_str())
            };

            let got = resolve_folder_id(&folders, &target);
            prop_assert_eq!(got, expected);
            // Pure: a second call yields the same answer.
            prop_assert_eq!(resolve_folder_id(&folders, &target), got);
        }
    }
}
