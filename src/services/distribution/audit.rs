use tracing::{info, warn};

use super::DistributionService;
use crate::errors::Result;
use crate::models::assignments::responses::DanglingPaper;
use crate::models::users::entities::Principal;
use crate::workflow::distribution::find_dangling;
use crate::workflow::{Operation, authorize_global};

pub async fn find_dangling_papers(
    service: &DistributionService,
    principal: &Principal,
) -> Result<Vec<DanglingPaper>> {
    authorize_global(principal, Operation::AuditData)?;
    let storage = service.storage();

    let assignments = storage.list_assignments().await?;
    let papers = storage.list_all_papers().await?;
    let dangling = find_dangling(&papers, &assignments);

    for orphan in &dangling {
        warn!(
            "Paper {} of student {} references missing assignment {}",
            orphan.paper_id, orphan.student_id, orphan.assignment_id
        );
    }
    info!(
        "Audit by user {}: {} papers checked, {} dangling",
        principal.user_id,
        papers.len(),
        dangling.len()
    );
    Ok(dangling)
}
