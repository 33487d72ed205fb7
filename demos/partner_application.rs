//! Partner application review
//!
//! Run: `cargo run --example partner_application`

use chrono::Utc;
use fraudguard_core::{FraudEvaluationContext, PartnerInfo};
use fraudguard_repository::{EnrollmentStatus, MemoryRepository, ProgramEnrollment};
use fraudguard_runtime::{ListService, DISPOSABLE_EMAIL_DOMAINS};
use fraudguard_sdk::observability::init_tracing;
use fraudguard_sdk::FraudDetectorBuilder;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let repo = Arc::new(MemoryRepository::new());
    repo.add_enrollment(ProgramEnrollment::new(
        "pn_shady",
        "prog_other",
        EnrollmentStatus::Banned,
    ))
    .await;

    let detector = FraudDetectorBuilder::new()
        .with_memory_repository(repo)
        .with_list_service(ListService::with_memory_list(
            DISPOSABLE_EMAIL_DOMAINS,
            ["mailinator.com"],
        ))
        .build()
        .await?;

    let mut verified = PartnerInfo::new("pn_good")
        .with_email("jane@janecooks.com")
        .with_website("https://janecooks.com");
    verified.website_verified_at = Some(Utc::now());

    let applicants = [
        verified,
        PartnerInfo::new("pn_shady").with_email("x1@privaterelay.appleid.com"),
        PartnerInfo::new("pn_burner")
            .with_email("deals@mailinator.com")
            .with_website("https://coupons.example"),
    ];

    for partner in applicants {
        let id = partner.id.clone();
        let ctx = FraudEvaluationContext::new("prog_acme", partner);
        match detector.assess_partner(&ctx).await {
            Some(assessment) => println!("{}: {}", id, serde_json::to_string_pretty(&assessment)?),
            None => println!("{}: not evaluated", id),
        }
    }

    Ok(())
}
