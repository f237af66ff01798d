//! In-memory repositories and a wired-up service graph for unit tests.
//!
//! The fakes mirror the PostgreSQL repositories closely enough for service
//! logic: case-insensitive uniqueness, foreign-key "in use" failures,
//! joined display names, filtering and paging.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::database::models::*;
use crate::database::repository::*;
use crate::database::DatabaseError;
use crate::services::*;
use crate::uploads::UploadStore;

fn page_of<T: Clone>(mut rows: Vec<T>, page: &crate::api::pagination::Page) -> (Vec<T>, i64) {
    let total = rows.len() as i64;
    let start = (page.offset as usize).min(rows.len());
    let end = (start + page.limit as usize).min(rows.len());
    (rows.drain(start..end).collect(), total)
}

fn contains_ci(haystack: &str, needle: Option<&str>) -> bool {
    needle.map_or(true, |n| haystack.to_lowercase().contains(&n.to_lowercase()))
}

fn wanted<T: PartialEq>(value: T, filter: Option<T>) -> bool {
    filter.map_or(true, |w| w == value)
}

fn next(counter: &AtomicI32) -> i32 {
    counter.fetch_add(1, Ordering::SeqCst) + 1
}

/// Divisions and categories share a shape: a unique name plus an active flag.
macro_rules! named_table {
    ($fake:ident, $row:ident, $filter:ident, $repo:ident, $constraint:literal) => {
        #[derive(Default)]
        pub struct $fake {
            rows: Mutex<Vec<$row>>,
            in_use: Mutex<HashSet<i32>>,
            ids: AtomicI32,
        }

        impl $fake {
            pub fn seed(&self, name: &str, is_active: bool) -> i32 {
                let id = next(&self.ids);
                self.rows.lock().unwrap().push($row {
                    id,
                    name: name.to_string(),
                    is_active,
                    created_at: Utc::now(),
                });
                id
            }

            /// Deleting this row will fail like a foreign-key violation
            pub fn mark_in_use(&self, id: i32) {
                self.in_use.lock().unwrap().insert(id);
            }

            pub fn name_of(&self, id: i32) -> String {
                self.rows
                    .lock()
                    .unwrap()
                    .iter()
                    .find(|r| r.id == id)
                    .map(|r| r.name.clone())
                    .unwrap_or_default()
            }

            fn name_taken(&self, name: &str, except: Option<i32>) -> bool {
                self.rows
                    .lock()
                    .unwrap()
                    .iter()
                    .any(|r| r.name.eq_ignore_ascii_case(name) && Some(r.id) != except)
            }
        }

        #[async_trait]
        impl $repo for $fake {
            async fn get_all(&self, filter: &$filter) -> Result<(Vec<$row>, i64), DatabaseError> {
                let mut rows: Vec<$row> = self
                    .rows
                    .lock()
                    .unwrap()
                    .iter()
                    .filter(|r| contains_ci(&r.name, filter.name.as_deref()))
                    .filter(|r| wanted(r.is_active, filter.is_active))
                    .filter(|r| wanted(r.created_at.date_naive(), filter.created_at))
                    .cloned()
                    .collect();
                rows.sort_by(|a, b| b.id.cmp(&a.id));
                Ok(page_of(rows, &filter.page))
            }

            async fn get_by_id(&self, id: i32) -> Result<Option<$row>, DatabaseError> {
                Ok(self.rows.lock().unwrap().iter().find(|r| r.id == id).cloned())
            }

            async fn get_by_name(&self, name: &str) -> Result<Option<$row>, DatabaseError> {
                Ok(self
                    .rows
                    .lock()
                    .unwrap()
                    .iter()
                    .find(|r| r.name.eq_ignore_ascii_case(name))
                    .cloned())
            }

            async fn exists(&self, id: i32) -> Result<bool, DatabaseError> {
                Ok(self.rows.lock().unwrap().iter().any(|r| r.id == id))
            }

            async fn create(&self, name: &str) -> Result<$row, DatabaseError> {
                if self.name_taken(name, None) {
                    return Err(DatabaseError::UniqueViolation($constraint.to_string()));
                }
                let id = self.seed(name, true);
                Ok(self.get_by_id(id).await?.expect("seeded row"))
            }

            async fn update(&self, id: i32, name: &str, is_active: bool) -> Result<Option<$row>, DatabaseError> {
                if self.name_taken(name, Some(id)) {
                    return Err(DatabaseError::UniqueViolation($constraint.to_string()));
                }
                let mut rows = self.rows.lock().unwrap();
                Ok(rows.iter_mut().find(|r| r.id == id).map(|r| {
                    r.name = name.to_string();
                    r.is_active = is_active;
                    r.clone()
                }))
            }

            async fn delete(&self, id: i32) -> Result<bool, DatabaseError> {
                if self.in_use.lock().unwrap().contains(&id) {
                    return Err(DatabaseError::ForeignKeyViolation($constraint.to_string()));
                }
                let mut rows = self.rows.lock().unwrap();
                let before = rows.len();
                rows.retain(|r| r.id != id);
                Ok(rows.len() != before)
            }
        }
    };
}

named_table!(InMemoryDivisions, Division, DivisionListFilter, DivisionRepository, "divisions_name_key");
named_table!(InMemoryCategories, Category, CategoryListFilter, CategoryRepository, "categories_name_key");

pub struct InMemoryUsers {
    divisions: Arc<InMemoryDivisions>,
    rows: Mutex<Vec<UserWithDivision>>,
    in_use: Mutex<HashSet<i32>>,
    ids: AtomicI32,
}

impl InMemoryUsers {
    pub fn new(divisions: Arc<InMemoryDivisions>) -> Self {
        Self {
            divisions,
            rows: Mutex::new(Vec::new()),
            in_use: Mutex::new(HashSet::new()),
            ids: AtomicI32::new(0),
        }
    }

    pub fn seed(&self, name: &str, email: &str, role: Role, division_id: i32, is_active: bool) -> i32 {
        let id = next(&self.ids);
        self.rows.lock().unwrap().push(UserWithDivision {
            id,
            name: name.to_string(),
            email: email.to_string(),
            password: "$2b$04$seeded".to_string(),
            avatar_url: None,
            phone: None,
            role: role.as_str().to_string(),
            division_id,
            division_name: self.divisions.name_of(division_id),
            is_active,
            created_at: Utc::now(),
        });
        id
    }

    pub fn mark_in_use(&self, id: i32) {
        self.in_use.lock().unwrap().insert(id);
    }

    pub fn name_of(&self, id: i32) -> String {
        self.find(id).map(|u| u.name).unwrap_or_default()
    }

    pub fn find(&self, id: i32) -> Option<UserWithDivision> {
        self.rows.lock().unwrap().iter().find(|u| u.id == id).cloned()
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn get_all(&self, filter: &UserListFilter) -> Result<(Vec<UserWithDivision>, i64), DatabaseError> {
        let mut rows: Vec<UserWithDivision> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|u| contains_ci(&u.name, filter.name.as_deref()))
            .filter(|u| wanted(u.role.as_str(), filter.role.as_deref()))
            .filter(|u| wanted(u.division_id, filter.division_id))
            .filter(|u| wanted(u.is_active, filter.is_active))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(page_of(rows, &filter.page))
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<UserWithDivision>, DatabaseError> {
        Ok(self.find(id))
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .map(|u| User {
                id: u.id,
                name: u.name.clone(),
                email: u.email.clone(),
                password: u.password.clone(),
                avatar_url: u.avatar_url.clone(),
                phone: u.phone.clone(),
                role: u.role.clone(),
                division_id: u.division_id,
                is_active: u.is_active,
                created_at: u.created_at,
            }))
    }

    async fn exists(&self, id: i32) -> Result<bool, DatabaseError> {
        Ok(self.find(id).is_some())
    }

    async fn create(&self, user: &NewUser) -> Result<UserWithDivision, DatabaseError> {
        if self.get_by_email(&user.email).await?.is_some() {
            return Err(DatabaseError::UniqueViolation("users_email_key".to_string()));
        }
        let id = self.seed(&user.name, &user.email, user.role, user.division_id, true);
        let mut rows = self.rows.lock().unwrap();
        let row = rows.iter_mut().find(|u| u.id == id).expect("seeded row");
        row.password = user.password_hash.clone();
        row.phone = user.phone.clone();
        Ok(row.clone())
    }

    async fn update(&self, id: i32, changes: &UserChanges) -> Result<Option<UserWithDivision>, DatabaseError> {
        let division_name = self.divisions.name_of(changes.division_id);
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.iter_mut().find(|u| u.id == id).map(|u| {
            u.name = changes.name.clone();
            u.phone = changes.phone.clone();
            u.role = changes.role.as_str().to_string();
            u.division_id = changes.division_id;
            u.division_name = division_name;
            u.is_active = changes.is_active;
            u.clone()
        }))
    }

    async fn update_avatar(&self, id: i32, avatar_url: &str) -> Result<Option<UserWithDivision>, DatabaseError> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.iter_mut().find(|u| u.id == id).map(|u| {
            u.avatar_url = Some(avatar_url.to_string());
            u.clone()
        }))
    }

    async fn delete(&self, id: i32) -> Result<bool, DatabaseError> {
        if self.in_use.lock().unwrap().contains(&id) {
            return Err(DatabaseError::ForeignKeyViolation("tickets_requester_id_fkey".to_string()));
        }
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|u| u.id != id);
        Ok(rows.len() != before)
    }
}

pub struct InMemoryTickets {
    categories: Arc<InMemoryCategories>,
    users: Arc<InMemoryUsers>,
    rows: Mutex<Vec<Ticket>>,
    ids: AtomicI32,
}

impl InMemoryTickets {
    pub fn new(categories: Arc<InMemoryCategories>, users: Arc<InMemoryUsers>) -> Self {
        Self {
            categories,
            users,
            rows: Mutex::new(Vec::new()),
            ids: AtomicI32::new(0),
        }
    }

    fn build(&self, id: i32, t: &NewTicket) -> Ticket {
        let now = Utc::now();
        Ticket {
            id,
            title: t.title.clone(),
            description: t.description.clone(),
            status: DEFAULT_STATUS.to_string(),
            priority: t.priority.as_str().to_string(),
            category_id: t.category_id,
            category_name: self.categories.name_of(t.category_id),
            requester_id: t.requester_id,
            requester_name: self.users.name_of(t.requester_id),
            assignee_id: t.assignee_id,
            assignee_name: t.assignee_id.map(|a| self.users.name_of(a)),
            created_at: now,
            updated_at: now,
        }
    }
}

#[async_trait]
impl TicketRepository for InMemoryTickets {
    async fn get_all(&self, filter: &TicketListFilter) -> Result<(Vec<Ticket>, i64), DatabaseError> {
        let mut rows: Vec<Ticket> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|t| contains_ci(&t.title, filter.title.as_deref()))
            .filter(|t| wanted(t.status.as_str(), filter.status.as_deref()))
            .filter(|t| wanted(t.priority.as_str(), filter.priority.as_deref()))
            .filter(|t| wanted(t.category_id, filter.category_id))
            .filter(|t| wanted(t.requester_id, filter.requester_id))
            .filter(|t| filter.assignee_id.map_or(true, |a| t.assignee_id == Some(a)))
            .filter(|t| wanted(t.created_at.date_naive(), filter.created_at))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(page_of(rows, &filter.page))
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Ticket>, DatabaseError> {
        Ok(self.rows.lock().unwrap().iter().find(|t| t.id == id).cloned())
    }

    async fn exists(&self, id: i32) -> Result<bool, DatabaseError> {
        Ok(self.rows.lock().unwrap().iter().any(|t| t.id == id))
    }

    async fn create(&self, ticket: &NewTicket) -> Result<Ticket, DatabaseError> {
        let row = self.build(next(&self.ids), ticket);
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn update(&self, id: i32, changes: &TicketChanges) -> Result<Option<Ticket>, DatabaseError> {
        let category_name = self.categories.name_of(changes.category_id);
        let assignee_name = changes.assignee_id.map(|a| self.users.name_of(a));
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.iter_mut().find(|t| t.id == id).map(|t| {
            t.title = changes.title.clone();
            t.description = changes.description.clone();
            t.status = changes.status.clone();
            t.priority = changes.priority.as_str().to_string();
            t.category_id = changes.category_id;
            t.category_name = category_name;
            t.assignee_id = changes.assignee_id;
            t.assignee_name = assignee_name;
            t.updated_at = Utc::now();
            t.clone()
        }))
    }

    async fn delete(&self, id: i32) -> Result<bool, DatabaseError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|t| t.id != id);
        Ok(rows.len() != before)
    }
}

pub struct InMemoryResolutions {
    users: Arc<InMemoryUsers>,
    rows: Mutex<Vec<TicketResolution>>,
    ids: AtomicI32,
}

impl InMemoryResolutions {
    pub fn new(users: Arc<InMemoryUsers>) -> Self {
        Self {
            users,
            rows: Mutex::new(Vec::new()),
            ids: AtomicI32::new(0),
        }
    }
}

#[async_trait]
impl TicketResolutionRepository for InMemoryResolutions {
    async fn get_all(
        &self,
        filter: &TicketResolutionListFilter,
    ) -> Result<(Vec<TicketResolution>, i64), DatabaseError> {
        let mut rows: Vec<TicketResolution> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| wanted(r.ticket_id, filter.ticket_id))
            .filter(|r| wanted(r.resolved_by, filter.resolved_by))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(page_of(rows, &filter.page))
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<TicketResolution>, DatabaseError> {
        Ok(self.rows.lock().unwrap().iter().find(|r| r.id == id).cloned())
    }

    async fn get_by_ticket_id(&self, ticket_id: i32) -> Result<Option<TicketResolution>, DatabaseError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.ticket_id == ticket_id)
            .cloned())
    }

    async fn create(&self, ticket_id: i32, resolved_by: i32, note: &str) -> Result<TicketResolution, DatabaseError> {
        if self.get_by_ticket_id(ticket_id).await?.is_some() {
            return Err(DatabaseError::UniqueViolation(
                "ticket_resolutions_ticket_id_key".to_string(),
            ));
        }
        let row = TicketResolution {
            id: next(&self.ids),
            ticket_id,
            resolved_by,
            resolver_name: self.users.name_of(resolved_by),
            note: note.to_string(),
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn update(&self, id: i32, note: &str) -> Result<Option<TicketResolution>, DatabaseError> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.iter_mut().find(|r| r.id == id).map(|r| {
            r.note = note.to_string();
            r.clone()
        }))
    }

    async fn delete(&self, id: i32) -> Result<bool, DatabaseError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.id != id);
        Ok(rows.len() != before)
    }
}

#[derive(Default)]
pub struct InMemoryAttachments {
    rows: Mutex<Vec<TicketAttachment>>,
    ids: AtomicI32,
    fail_next_insert: AtomicBool,
}

impl InMemoryAttachments {
    /// The next `create` fails like a lost connection
    pub fn fail_next_insert(&self) {
        self.fail_next_insert.store(true, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl TicketAttachmentRepository for InMemoryAttachments {
    async fn get_all(
        &self,
        filter: &TicketAttachmentListFilter,
    ) -> Result<(Vec<TicketAttachment>, i64), DatabaseError> {
        let mut rows: Vec<TicketAttachment> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|a| wanted(a.ticket_id, filter.ticket_id))
            .filter(|a| wanted(a.file_type.as_str(), filter.file_type.as_deref()))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(page_of(rows, &filter.page))
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<TicketAttachment>, DatabaseError> {
        Ok(self.rows.lock().unwrap().iter().find(|a| a.id == id).cloned())
    }

    async fn get_by_ticket_id(&self, ticket_id: i32) -> Result<Vec<TicketAttachment>, DatabaseError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.ticket_id == ticket_id)
            .cloned()
            .collect())
    }

    async fn create(&self, attachment: &NewTicketAttachment) -> Result<TicketAttachment, DatabaseError> {
        if self.fail_next_insert.swap(false, Ordering::SeqCst) {
            return Err(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        let row = TicketAttachment {
            id: next(&self.ids),
            ticket_id: attachment.ticket_id,
            file_url: attachment.file_url.clone(),
            file_name: attachment.file_name.clone(),
            file_type: attachment.file_type.as_str().to_string(),
            file_size: attachment.file_size,
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn delete(&self, id: i32) -> Result<bool, DatabaseError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|a| a.id != id);
        Ok(rows.len() != before)
    }
}

/// Every service wired over in-memory repositories and a throwaway upload dir
pub struct TestContext {
    pub divisions: Arc<InMemoryDivisions>,
    pub categories: Arc<InMemoryCategories>,
    pub users: Arc<InMemoryUsers>,
    pub tickets: Arc<InMemoryTickets>,
    pub resolutions: Arc<InMemoryResolutions>,
    pub attachments: Arc<InMemoryAttachments>,
    pub uploads: UploadStore,
    pub division_service: DivisionService,
    pub category_service: CategoryService,
    pub user_service: UserService,
    pub ticket_service: TicketService,
    pub resolution_service: TicketResolutionService,
    pub attachment_service: TicketAttachmentService,
}

pub const TEST_BASE_URL: &str = "http://helpdesk.test";

/// Cheapest bcrypt cost the crate accepts
const TEST_BCRYPT_COST: u32 = 4;

impl TestContext {
    pub fn new() -> Self {
        let divisions = Arc::new(InMemoryDivisions::default());
        let categories = Arc::new(InMemoryCategories::default());
        let users = Arc::new(InMemoryUsers::new(divisions.clone()));
        let tickets = Arc::new(InMemoryTickets::new(categories.clone(), users.clone()));
        let resolutions = Arc::new(InMemoryResolutions::new(users.clone()));
        let attachments = Arc::new(InMemoryAttachments::default());
        let uploads = UploadStore::new(
            std::env::temp_dir().join(format!("helpdesk-test-{}", Uuid::new_v4().simple())),
        );

        let division_service = DivisionService::new(divisions.clone());
        let category_service = CategoryService::new(categories.clone());
        let user_service = UserService::new(
            users.clone(),
            division_service.clone(),
            uploads.clone(),
            TEST_BASE_URL.to_string(),
            TEST_BCRYPT_COST,
        );
        let ticket_service = TicketService::new(
            tickets.clone(),
            attachments.clone(),
            category_service.clone(),
            user_service.clone(),
            uploads.clone(),
        );
        let resolution_service =
            TicketResolutionService::new(resolutions.clone(), tickets.clone(), user_service.clone());
        let attachment_service = TicketAttachmentService::new(
            attachments.clone(),
            tickets.clone(),
            uploads.clone(),
            TEST_BASE_URL.to_string(),
        );

        Self {
            divisions,
            categories,
            users,
            tickets,
            resolutions,
            attachments,
            uploads,
            division_service,
            category_service,
            user_service,
            ticket_service,
            resolution_service,
            attachment_service,
        }
    }

    /// An active division, an active category, and an active STAFF user in that division
    pub fn seed_basics(&self) -> (i32, i32, i32) {
        let division_id = self.divisions.seed("Support", true);
        let category_id = self.categories.seed("Hardware", true);
        let user_id = self
            .users
            .seed("Sam Staff", "sam@example.com", Role::Staff, division_id, true);
        (division_id, category_id, user_id)
    }

    /// A ticket filed by `requester_id`, bypassing service validation
    pub async fn seed_ticket(&self, category_id: i32, requester_id: i32) -> i32 {
        self.tickets
            .create(&NewTicket {
                title: "Laptop will not boot".to_string(),
                description: "Black screen after the vendor logo".to_string(),
                priority: Priority::High,
                category_id,
                requester_id,
                assignee_id: None,
            })
            .await
            .expect("in-memory insert")
            .id
    }

    pub async fn cleanup(&self) {
        let _ = tokio::fs::remove_dir_all(self.uploads.root()).await;
    }
}
