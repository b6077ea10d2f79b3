/// How an action of a given classification behaves when a run is rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Has a known inverse operation; rollback dispatches it.
    Reversible,
    /// No safe inverse exists (a pushed commit, a merged PR, a deleted Slack message, DDL).
    /// Rollback records that the action was skipped but does not attempt anything.
    Irreversible,
    /// Never mutated anything; nothing to reverse.
    ReadOnly,
}

/// How to build the inverse call for a reversible action.
#[derive(Clone, Copy)]
pub(crate) enum Inverse {
    /// Call the same connector with this action name, passing `rollbackData` verbatim as
    /// arguments.
    SameArgs(&'static str),
    /// `filesystem.write_file`'s inverse depends on what was captured: restore the prior
    /// content if there was one, otherwise delete the file that didn't exist before.
    FilesystemRestore,
}

struct CatalogEntry {
    system:         &'static str,
    action:         &'static str,
    classification: Classification,
    inverse:        Option<Inverse>,
}

/// Fixed dispatch table: for every mutating action this rollback engine knows about, its
/// classification and (if reversible) its inverse.
///
/// Entries absent from this table fall back to [`classify`]'s conservative default:
/// `Irreversible` unless the action name matches one of the generic read-only prefixes
/// (`select_rows`, `get_*`, `list_*`). This covers the catalog's wildcard rows (`postgres.*`
/// DDL, `*.select_rows`/`get_*`/`list_*`) without needing one entry per concrete system.
const CATALOG: &[CatalogEntry] = &[
    CatalogEntry { system: "github", action: "create_branch", classification: Classification::Reversible, inverse: Some(Inverse::SameArgs("delete_branch")) },
    CatalogEntry { system: "github", action: "create_pr", classification: Classification::Reversible, inverse: Some(Inverse::SameArgs("close_pr")) },
    CatalogEntry { system: "github", action: "create_issue", classification: Classification::Reversible, inverse: Some(Inverse::SameArgs("close_issue")) },
    CatalogEntry { system: "github", action: "delete_branch", classification: Classification::Reversible, inverse: Some(Inverse::SameArgs("create_branch_from_sha")) },
    CatalogEntry { system: "github", action: "merge_pr", classification: Classification::Reversible, inverse: Some(Inverse::SameArgs("revert_commit")) },
    CatalogEntry { system: "github", action: "push_commit", classification: Classification::Irreversible, inverse: None },
    CatalogEntry { system: "postgres", action: "insert_row", classification: Classification::Reversible, inverse: Some(Inverse::SameArgs("delete_row")) },
    CatalogEntry { system: "postgres", action: "update_row", classification: Classification::Reversible, inverse: Some(Inverse::SameArgs("restore_row")) },
    CatalogEntry { system: "postgres", action: "delete_row", classification: Classification::Reversible, inverse: Some(Inverse::SameArgs("insert_row")) },
    CatalogEntry { system: "filesystem", action: "write_file", classification: Classification::Reversible, inverse: Some(Inverse::FilesystemRestore) },
    CatalogEntry { system: "filesystem", action: "delete_file", classification: Classification::Reversible, inverse: Some(Inverse::SameArgs("write_file")) },
    CatalogEntry { system: "filesystem", action: "read_file", classification: Classification::ReadOnly, inverse: None },
    CatalogEntry { system: "filesystem", action: "list_dir", classification: Classification::ReadOnly, inverse: None },
    CatalogEntry { system: "slack", action: "post_message", classification: Classification::Reversible, inverse: Some(Inverse::SameArgs("delete_message")) },
    CatalogEntry { system: "slack", action: "delete_message", classification: Classification::Irreversible, inverse: None },
];

fn lookup(system: &str, action: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|e| e.system == system && e.action == action)
}

pub fn classify(system: &str, action: &str) -> Classification {
    if let Some(entry) = lookup(system, action) {
        return entry.classification;
    }
    if action == "select_rows" || action.starts_with("get_") || action.starts_with("list_") {
        return Classification::ReadOnly;
    }
    Classification::Irreversible
}

pub(crate) fn inverse_of(system: &str, action: &str) -> Option<Inverse> {
    lookup(system, action).and_then(|e| e.inverse)
}
