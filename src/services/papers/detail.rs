use tracing::debug;

use super::PaperService;
use crate::errors::Result;
use crate::models::papers::responses::PaperDetail;
use crate::models::users::entities::Principal;
use crate::services::access::{authorize_paper, final_score_of, load_paper};
use crate::workflow::Operation;

pub async fn get_paper(
    service: &PaperService,
    principal: &Principal,
    paper_id: i64,
) -> Result<PaperDetail> {
    let storage = service.storage();
    let paper = load_paper(storage, paper_id).await?;
    authorize_paper(storage, principal, Operation::ViewPaper, &paper).await?;

    let final_score = final_score_of(storage, &paper).await?;
    debug!(
        "Paper {} read by user {}: content {:?}, score {:?}",
        paper_id, principal.user_id, paper.content_approval_status, final_score.score
    );

    Ok(PaperDetail { paper, final_score })
}
