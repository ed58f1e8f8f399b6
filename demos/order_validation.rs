//! Order Validation
//!
//! This example validates an order with nested lines and customer data.
//!
//! Key concepts:
//! - Property rules with cascade and transformers
//! - Collection rules with filters and indexed failure names
//! - Dependent rules gated on their parent
//! - Nested validators and rule sets
//! - Synchronous and asynchronous entry points
//!
//! Run with: RUST_LOG=rulebook=debug cargo run --example order_validation

use futures::FutureExt;
use rulebook::builder::{CollectionRuleBuilder, RuleBuilder, ValidatorBuilder};
use rulebook::engine::{Validator, ValidatorConfig};
use rulebook::rules::{CascadeMode, Check};
use rulebook::BuildError;
use serde::Serialize;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Serialize)]
struct Line {
    sku: String,
    quantity: u32,
    gift: bool,
}

#[derive(Debug, Clone, Serialize)]
struct Customer {
    name: String,
    email: String,
}

#[derive(Debug, Clone)]
struct Order {
    reference: String,
    customer: Customer,
    lines: Vec<Line>,
    coupon: Option<String>,
}

fn customer_validator() -> Result<Validator<Customer>, BuildError> {
    ValidatorBuilder::new()
        .rules(|sink| {
            sink.add(
                RuleBuilder::for_property("Name", |c: &Customer| c.name.clone())?
                    .check(Check::must("required", |n: &String| !n.is_empty(), "'{PropertyName}' is required"))?
                    .build(),
            );
            sink.add(
                RuleBuilder::for_property("Email", |c: &Customer| c.email.clone())?
                    .cascade(CascadeMode::Stop)
                    .check(Check::must("required", |e: &String| !e.is_empty(), "'{PropertyName}' is required"))?
                    .check(Check::must("shape", |e: &String| e.contains('@'), "'{PropertyValue}' is not an email address"))?
                    .check(Check::must_async(
                        "not_blocked",
                        |e: &String| {
                            let blocked = e.ends_with("@blocked.example");
                            async move { !blocked }.boxed()
                        },
                        "'{PropertyValue}' is blocked",
                    ))?
                    .build(),
            );
            Ok(())
        })?
        .build()
}

fn order_validator(config: ValidatorConfig) -> Result<Validator<Order>, BuildError> {
    let customers = Arc::new(customer_validator()?);

    ValidatorBuilder::new()
        .config(config)
        .rules(|sink| {
            sink.add(
                RuleBuilder::for_property("Reference", |o: &Order| o.reference.clone())?
                    .check(Check::must("required", |r: &String| !r.is_empty(), "'{PropertyName}' is required"))?
                    .dependent_rules(|deps| {
                        deps.add(
                            RuleBuilder::for_property("Reference", |o: &Order| o.reference.clone())?
                                .display_name("Reference length")
                                .transform(|_o: &Order, r: String| r.chars().count())?
                                .check(Check::must("exact", |n: &usize| *n == 8, "'{PropertyName}' must be 8, got {PropertyValue}"))?
                                .build(),
                        );
                        Ok(())
                    })?
                    .build(),
            );
            sink.add(
                RuleBuilder::for_property("Customer", |o: &Order| o.customer.clone())?
                    .check(Check::child("customer", Arc::clone(&customers)))?
                    .build(),
            );
            sink.add(
                CollectionRuleBuilder::for_each("Lines", |o: &Order| o.lines.clone())?
                    .filter(|line: &Line| !line.gift)
                    .check(Check::must_with(
                        "quantity",
                        |_o: &Order, line: &Line| line.quantity > 0,
                        "'{PropertyName}' must order at least one item",
                    ))?
                    .build(),
            );
            sink.add(
                RuleBuilder::for_property("Coupon", |o: &Order| o.coupon.clone())?
                    .in_rule_set("promotions")?
                    .when(|o: &Order| o.coupon.is_some())
                    .check(Check::must(
                        "known",
                        |c: &Option<String>| c.as_deref() == Some("WELCOME10"),
                        "unknown coupon {PropertyValue}",
                    ))?
                    .build(),
            );
            Ok(())
        })?
        .build()
}

fn sample_order() -> Order {
    Order {
        reference: "ORD-1".to_string(),
        customer: Customer {
            name: String::new(),
            email: "guest@blocked.example".to_string(),
        },
        lines: vec![
            Line {
                sku: "SKU-1".to_string(),
                quantity: 2,
                gift: false,
            },
            Line {
                sku: "WRAP".to_string(),
                quantity: 0,
                gift: true,
            },
            Line {
                sku: "SKU-2".to_string(),
                quantity: 0,
                gift: false,
            },
        ],
        coupon: Some("SPRING".to_string()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rulebook=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Order Validation ===\n");

    let order = sample_order();

    let validator = order_validator(ValidatorConfig::default())?;
    let result = validator.validate(&order)?;
    println!("Default rules ({} failures):", result.failures().len());
    for failure in result.failures() {
        println!("  {}: {}", failure.property_name, failure);
    }

    let config = ValidatorConfig::from_json(r#"{ "rule_sets": ["default", "promotions"] }"#)?;
    let validator = order_validator(config)?;
    let result = validator.validate_async(&order).await?;
    println!("\nWith promotions ({} failures):", result.failures().len());
    for failure in result.failures() {
        println!("  {}: {}", failure.property_name, failure);
    }

    let strict = order_validator(ValidatorConfig::new().with_cascade(CascadeMode::Stop))?;
    let result = strict.validate(&order)?;
    println!("\nStop at first failing rule:\n{result}");

    Ok(())
}
