//! Route Command
//!
//! Send one prompt through the router and print the completion.
//!
//! Usage:
//!   prompt-router route "<prompt>" [--enhanced TEXT] [--user-id ID]
//!                       [--deadline SECS] [--metrics] [-f json]

use serde_json::json;
use std::time::Duration;

use crate::ai::timeout::with_timeout;
use crate::cli::{Output, is_json};
use crate::config::Config;
use crate::router::{RouteOptions, Router};
use crate::types::Result;

pub struct RouteArgs {
    pub prompt: String,
    pub enhanced: Option<String>,
    pub user_id: Option<String>,
    /// Overall bound across enhancement and every fallback attempt
    pub deadline: Option<Duration>,
    /// Print the router's metrics summary after the request
    pub show_metrics: bool,
    pub format: String,
}

pub async fn run(config: &Config, args: RouteArgs) -> Result<()> {
    let router = Router::from_config(config)?;

    let options = RouteOptions {
        user_id: args.user_id,
        pre_enhanced_prompt: args.enhanced,
    };

    let outcome = match args.deadline {
        Some(deadline) => with_timeout(deadline, router.route(&args.prompt, options), "route").await,
        None => router.route(&args.prompt, options).await,
    };

    let output = Output::new();
    let result = match outcome {
        Ok(result) => result,
        Err(e) => {
            if args.show_metrics && !is_json(&args.format) {
                output.metrics(&router.metrics().snapshot());
            }
            return Err(e);
        }
    };

    if is_json(&args.format) {
        let report = if args.show_metrics {
            json!({
                "result": result,
                "metrics": router.metrics().snapshot(),
            })
        } else {
            serde_json::to_value(&result)?
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        output.route_result(&result);
        if args.show_metrics {
            output.metrics(&router.metrics().snapshot());
        }
    }

    Ok(())
}
