//! Food photo analysis with caching and budget enforcement
//!
//! Flow for one request:
//! 1. derive the cache key from the image prefix
//! 2. on a hit, count it and answer from the cache (free, no budget check)
//! 3. on a miss, check the user's monthly budget before paying for a call
//! 4. ask the AI gateway, parse its JSON, store it, answer
//!
//! Usage is recorded after the answer is known, detached from the request.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::ai::{AiGateway, extract_json_object, prompts::food_scan_prompt};
use crate::config::{BudgetConfig, ScanConfig};
use crate::database::repositories::FoodScanCacheSeaOrmRepository;
use crate::errors::{AppError, AppResult};
use crate::models::{FoodScanOutcome, FoodScanRequest, NutritionAnalysis};
use crate::utils::{image_cache_key, image_data_url};

use super::{BudgetDecision, BudgetGate, UsageRecorder};

#[derive(Clone)]
pub struct FoodScanService {
    cache: FoodScanCacheSeaOrmRepository,
    budget_gate: BudgetGate,
    usage_recorder: UsageRecorder,
    ai_gateway: Arc<dyn AiGateway>,
    scan_config: ScanConfig,
    budget_config: BudgetConfig,
}

impl FoodScanService {
    pub fn new(
        cache: FoodScanCacheSeaOrmRepository,
        budget_gate: BudgetGate,
        usage_recorder: UsageRecorder,
        ai_gateway: Arc<dyn AiGateway>,
        scan_config: ScanConfig,
        budget_config: BudgetConfig,
    ) -> Self {
        Self {
            cache,
            budget_gate,
            usage_recorder,
            ai_gateway,
            scan_config,
            budget_config,
        }
    }

    pub async fn analyze(&self, request: FoodScanRequest) -> AppResult<FoodScanOutcome> {
        let image = request.image_base64.trim();
        if image.is_empty() {
            return Err(AppError::validation("imageBase64 is required"));
        }

        let language = request.language;
        let user_id = request
            .user_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty());
        let image_hash = image_cache_key(image, self.scan_config.hash_prefix_len);

        if let Some(entry) = self.cache.find(&image_hash, language).await? {
            info!("Food scan cache hit for {} ({})", image_hash, language);
            if let Err(e) = self.cache.record_hit(entry.id).await {
                // The answer is still valid; only the counter is lost
                warn!("Failed to count cache hit for {}: {}", image_hash, e);
            }
            if let Some(user_id) = user_id {
                self.usage_recorder.record_scan(user_id, true);
            }
            return Ok(FoodScanOutcome {
                analysis: entry.analysis,
                cached: true,
                image_hash,
            });
        }

        debug!("Food scan cache miss for {} ({})", image_hash, language);

        if let Some(user_id) = user_id {
            if let BudgetDecision::Denied(denial) = self
                .budget_gate
                .check(user_id, self.budget_config.scan_cost_cents)
                .await
            {
                info!(
                    "Denied food scan for {}: {} of {} cents used",
                    user_id, denial.total_cost_cents, denial.monthly_limit_cents
                );
                return Err(AppError::BudgetExceeded(denial));
            }
        }

        let prompt = food_scan_prompt(language, &image_data_url(image));
        let completion = self.ai_gateway.complete(prompt).await?;

        // A parse failure returns before anything is written to the cache
        let analysis: NutritionAnalysis = extract_json_object(&completion)?;

        // Insert failures are logged only; the analysis is still returned
        match self.cache.insert(&image_hash, language, &analysis).await {
            Ok(_) => info!("Analyzed and cached food scan {} ({})", image_hash, language),
            Err(e) => warn!("Failed to cache food scan {}: {}", image_hash, e),
        }

        if let Some(user_id) = user_id {
            self.usage_recorder.record_scan(user_id, false);
        }

        Ok(FoodScanOutcome {
            analysis,
            cached: false,
            image_hash,
        })
    }
}
