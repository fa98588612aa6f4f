//! [`AnalysisService`], the entry point for every query.

use std::sync::Arc;

use chrono_tz::Tz;
use uuid::Uuid;

use stride_core::{
  TimeWindow,
  assessment::Assessment,
  indicator::{Indicator, footstep_indicators},
  profile::FallRiskProfile,
  scoring::{RiskScorer, TinettiRegression},
  source::GaitSource,
};

use crate::{
  Error, Result,
  best::BestAssessmentSelector,
  cache::{BucketedCache, CacheKey, Clock, SystemClock},
  config::{AnalysisConfig, SelectionPolicy},
  profiles::{FallRiskProfileSelector, assess},
  resolver::WearableAssignmentResolver,
};

/// Answers indicator and assessment queries against a [`GaitSource`].
///
/// The service owns the group cache, so construct it once and share it.
pub struct AnalysisService<S, C = SystemClock> {
  source:      Arc<S>,
  scorer:      Arc<dyn RiskScorer>,
  policy:      SelectionPolicy,
  time_zone:   Tz,
  group_cache: BucketedCache<Vec<Assessment>, C>,
}

impl<S: GaitSource> AnalysisService<S> {
  pub fn new(source: Arc<S>, config: &AnalysisConfig) -> Result<Self> {
    Self::with_clock(source, config, SystemClock)
  }
}

impl<S: GaitSource, C: Clock> AnalysisService<S, C> {
  pub fn with_clock(source: Arc<S>, config: &AnalysisConfig, clock: C) -> Result<Self> {
    Ok(Self {
      source,
      scorer: Arc::new(TinettiRegression),
      policy: config.selection_policy,
      time_zone: config.time_zone()?,
      group_cache: BucketedCache::new(config.cache_ttl()?, clock),
    })
  }

  /// Replace the default [`TinettiRegression`] scorer.
  pub fn with_scorer(mut self, scorer: impl RiskScorer + 'static) -> Self {
    self.scorer = Arc::new(scorer);
    self
  }

  pub fn source(&self) -> &S { &self.source }

  pub fn group_cache(&self) -> &BucketedCache<Vec<Assessment>, C> { &self.group_cache }

  fn profiles(&self) -> FallRiskProfileSelector<'_, S> {
    FallRiskProfileSelector::new(self.source.as_ref())
  }

  fn best(&self) -> BestAssessmentSelector<'_> {
    BestAssessmentSelector::new(self.scorer.as_ref(), self.policy, self.time_zone)
  }

  // ── Indicators ────────────────────────────────────────────────────────

  /// All footstep indicators for one wearable. Rates are computed over the
  /// full window, not the footstep span.
  pub async fn indicators_for_wearable(
    &self,
    wearable_id: &str,
    window: TimeWindow,
  ) -> Result<Vec<Indicator>> {
    let ids = [wearable_id.to_owned()];
    let footsteps = self
      .source
      .footsteps(&ids, window)
      .await
      .map_err(Error::from_source)?;
    tracing::debug!(wearable_id, count = footsteps.len(), "computing wearable indicators");
    Ok(footstep_indicators(&footsteps, Some(&window)))
  }

  /// All footstep indicators for a user, across every wearable assigned to
  /// them during `window`.
  pub async fn indicators_for_user(&self, user_id: Uuid, window: TimeWindow) -> Result<Vec<Indicator>> {
    let footsteps = WearableAssignmentResolver::new(self.source.as_ref())
      .footsteps_for_user(user_id, window)
      .await?;
    Ok(footstep_indicators(&footsteps, Some(&window)))
  }

  // ── Assessments ───────────────────────────────────────────────────────

  pub async fn select_fall_risk_assessments_for_user(
    &self,
    user_id: Uuid,
    window: TimeWindow,
    include_hidden: bool,
  ) -> Result<Vec<Assessment>> {
    let profiles = self.profiles().for_user(user_id, window, include_hidden).await?;
    Ok(assess(profiles, self.scorer.as_ref()))
  }

  pub async fn select_fall_risk_assessments_for_wearable(
    &self,
    wearable_id: &str,
    window: TimeWindow,
    include_hidden: bool,
  ) -> Result<Vec<Assessment>> {
    let profiles = self
      .profiles()
      .for_wearable(wearable_id, window, include_hidden)
      .await?;
    Ok(assess(profiles, self.scorer.as_ref()))
  }

  /// The best visible assessment of `user_id` ending inside `window`.
  pub async fn select_best_assessment(
    &self,
    user_id: Uuid,
    window: TimeWindow,
  ) -> Result<Option<Assessment>> {
    let candidates = self.profiles().for_user(user_id, window, false).await?;
    Ok(self.best().select(user_id, &window, candidates))
  }

  /// The best assessment of every user in a group, in input order, skipping
  /// users without one. Cached per five-minute bucket of `window.end`.
  pub async fn select_latest_best_for_group(
    &self,
    group_id: Uuid,
    user_ids: &[Uuid],
    window: TimeWindow,
  ) -> Result<Vec<Assessment>> {
    let key = CacheKey::new(group_id, &window, self.time_zone);
    self
      .group_cache
      .get_or_compute(key, || async move {
        tracing::info!(%group_id, users = user_ids.len(), "computing group assessments");
        let mut latest = Vec::with_capacity(user_ids.len());
        for &user_id in user_ids {
          if let Some(assessment) = self.select_best_assessment(user_id, window).await? {
            latest.push(assessment);
          }
        }
        Ok::<_, Error>(latest)
      })
      .await
  }

  /// Score a profile derived on the fly from the raw footsteps of a
  /// wearable. `None` when no footstep in `window` has a position.
  pub async fn assess_wearable_footsteps(
    &self,
    wearable_id: &str,
    window: TimeWindow,
  ) -> Result<Option<Assessment>> {
    let ids = [wearable_id.to_owned()];
    let footsteps = self
      .source
      .footsteps(&ids, window)
      .await
      .map_err(Error::from_source)?;
    Ok(
      FallRiskProfile::from_footsteps(&footsteps, Some(&window))
        .map(|profile| Assessment::scored(profile, self.scorer.as_ref())),
    )
  }
}
