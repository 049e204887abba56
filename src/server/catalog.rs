//! Static datasets behind the mock endpoints: the download catalog and the
//! seeded users/tasks rows. Read-only lookup tables.

use crate::common::{TaskRecord, UserRecord};

/// One downloadable file: declared metadata only, payload is allocated on
/// demand at the declared size.
pub struct CatalogFile {
    pub id: &'static str,
    pub name: &'static str,
    pub size: u64,
    pub content_type: &'static str,
}

pub const DOWNLOAD_CATALOG: &[CatalogFile] = &[
    CatalogFile {
        id: "1",
        name: "document.pdf",
        size: 2_048_576,
        content_type: "application/pdf",
    },
    CatalogFile {
        id: "2",
        name: "image.png",
        size: 512_000,
        content_type: "image/png",
    },
    CatalogFile {
        id: "3",
        name: "data.json",
        size: 102_400,
        content_type: "application/json",
    },
];

/// The authenticated report download.
pub const REPORT_FILE: CatalogFile = CatalogFile {
    id: "report",
    name: "report.pdf",
    size: 1_024_000,
    content_type: "application/pdf",
};

pub fn find_file(id: &str) -> Option<&'static CatalogFile> {
    DOWNLOAD_CATALOG.iter().find(|file| file.id == id)
}

pub fn seed_users() -> Vec<UserRecord> {
    vec![
        UserRecord {
            id: 1,
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            role: "admin".to_string(),
            status: "active".to_string(),
        },
        UserRecord {
            id: 2,
            name: "Bob".to_string(),
            email: "bob@example.com".to_string(),
            role: "user".to_string(),
            status: "active".to_string(),
        },
        UserRecord {
            id: 3,
            name: "Charlie".to_string(),
            email: "charlie@example.com".to_string(),
            role: "user".to_string(),
            status: "inactive".to_string(),
        },
    ]
}

pub fn find_user(id: u32) -> Option<UserRecord> {
    seed_users().into_iter().find(|user| user.id == id)
}

pub fn seed_tasks() -> Vec<TaskRecord> {
    vec![
        TaskRecord {
            id: 1,
            title: "Review PR".to_string(),
            status: "pending".to_string(),
            priority: "high".to_string(),
        },
        TaskRecord {
            id: 2,
            title: "Update docs".to_string(),
            status: "in_progress".to_string(),
            priority: "medium".to_string(),
        },
        TaskRecord {
            id: 3,
            title: "Fix bug #123".to_string(),
            status: "completed".to_string(),
            priority: "high".to_string(),
        },
    ]
}
