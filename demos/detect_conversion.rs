//! Conversion fraud detection
//!
//! Run: `cargo run --example detect_conversion`

use fraudguard_core::{CustomerInfo, FraudEvaluationContext, FraudRuleOverride, PartnerInfo};
use fraudguard_core::{FraudRuleType, RiskLevel};
use fraudguard_repository::{FraudEventRepository, MemoryRepository};
use fraudguard_runtime::{ListService, DISPOSABLE_EMAIL_DOMAINS};
use fraudguard_sdk::observability::init_tracing;
use fraudguard_sdk::FraudDetectorBuilder;
use serde_json::json;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let repo = Arc::new(MemoryRepository::new());
    // This program bans referrals from a competitor's domain
    repo.upsert_override(
        FraudRuleOverride::new(
            "fr_banned",
            "prog_acme",
            FraudRuleType::BannedReferralDomain,
            RiskLevel::High,
        )
        .with_config(json!({ "domains": ["competitor.io"] })),
    )
    .await;

    let detector = FraudDetectorBuilder::new()
        .with_memory_repository(repo.clone())
        .with_list_service(ListService::with_memory_list(
            DISPOSABLE_EMAIL_DOMAINS,
            ["mailinator.com", "yopmail.com"],
        ))
        .build()
        .await?;

    let conversions = [
        ("steven@acme.com", "Steven.Lee+deal@acme.com"),
        ("partner@blog.dev", "buyer@mailinator.com"),
        ("partner@blog.dev", "ops@eu.competitor.io"),
        ("partner@blog.dev", "happy.customer@example.org"),
    ];

    for (i, (partner_email, customer_email)) in conversions.iter().enumerate() {
        let ctx = FraudEvaluationContext::new(
            "prog_acme",
            PartnerInfo::new("pn_1").with_email(*partner_email),
        )
        .with_customer(CustomerInfo::new(format!("cus_{}", i)).with_email(*customer_email))
        .with_commission(format!("cm_{}", i))
        .with_click(
            Some("https://acme.com/pricing?gclid=xyz".to_string()),
            Some("https://www.google.com/".to_string()),
        );

        match detector.detect_and_record_fraud(&ctx).await {
            Some(event) => println!(
                "{} -> {}",
                customer_email,
                serde_json::to_string_pretty(&event)?
            ),
            None => println!("{} -> clean", customer_email),
        }
    }

    let stored = repo.list_fraud_events("prog_acme").await?;
    println!("{} fraud events stored", stored.len());
    Ok(())
}
