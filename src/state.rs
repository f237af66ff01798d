use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::database::repository::{
    PgCategoryRepository, PgDivisionRepository, PgTicketAttachmentRepository, PgTicketRepository,
    PgTicketResolutionRepository, PgUserRepository,
};
use crate::services::{
    CategoryService, DivisionService, TicketAttachmentService, TicketResolutionService, TicketService,
    UserService,
};
use crate::uploads::UploadStore;

/// Shared handles for every request
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub uploads: UploadStore,
    pub divisions: DivisionService,
    pub categories: CategoryService,
    pub users: UserService,
    pub tickets: TicketService,
    pub ticket_resolutions: TicketResolutionService,
    pub ticket_attachments: TicketAttachmentService,
}

impl AppState {
    /// Wire PostgreSQL repositories into the service graph
    pub fn new(pool: PgPool, config: &AppConfig) -> Self {
        let uploads = UploadStore::new(config.uploads.dir.clone());
        let base_url = config.app.base_url.clone();

        let ticket_repo = Arc::new(PgTicketRepository::new(pool.clone()));
        let attachment_repo = Arc::new(PgTicketAttachmentRepository::new(pool.clone()));

        let divisions = DivisionService::new(Arc::new(PgDivisionRepository::new(pool.clone())));
        let categories = CategoryService::new(Arc::new(PgCategoryRepository::new(pool.clone())));
        let users = UserService::new(
            Arc::new(PgUserRepository::new(pool.clone())),
            divisions.clone(),
            uploads.clone(),
            base_url.clone(),
            config.security.bcrypt_cost,
        );
        let tickets = TicketService::new(
            ticket_repo.clone(),
            attachment_repo.clone(),
            categories.clone(),
            users.clone(),
            uploads.clone(),
        );
        let ticket_resolutions = TicketResolutionService::new(
            Arc::new(PgTicketResolutionRepository::new(pool.clone())),
            ticket_repo.clone(),
            users.clone(),
        );
        let ticket_attachments =
            TicketAttachmentService::new(attachment_repo, ticket_repo, uploads.clone(), base_url);

        Self {
            pool,
            uploads,
            divisions,
            categories,
            users,
            tickets,
            ticket_resolutions,
            ticket_attachments,
        }
    }
}
