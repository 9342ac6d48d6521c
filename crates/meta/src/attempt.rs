use anyhow::anyhow;
use campaign_core::types::CreationStage;
use campaign_core::{CampaignError, CampaignResult};

/// Remote ids accumulated during one attempt. An id is only present once its
/// create call has returned successfully.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteCampaignRecord {
    pub campaign_id: Option<String>,
    pub ad_set_id: Option<String>,
    pub creative_id: Option<String>,
    pub ad_id: Option<String>,
}

impl RemoteCampaignRecord {
    /// Objects that exist on the platform, as `(kind, id)` pairs.
    pub fn created_objects(&self) -> Vec<(&'static str, &str)> {
        [
            ("campaign", &self.campaign_id),
            ("ad_set", &self.ad_set_id),
            ("creative", &self.creative_id),
            ("ad", &self.ad_id),
        ]
        .into_iter()
        .filter_map(|(kind, id)| id.as_deref().map(|id| (kind, id)))
        .collect()
    }
}

/// Guards a single creation attempt by enforcing the linear
/// `START -> ... -> PERSISTED` chain, with `FAILED` reachable from any
/// non-terminal stage.
#[derive(Debug, Clone)]
pub struct CreationAttempt {
    stage: CreationStage,
    furthest: CreationStage,
    record: RemoteCampaignRecord,
}

impl CreationAttempt {
    pub fn new() -> Self {
        Self {
            stage: CreationStage::Start,
            furthest: CreationStage::Start,
            record: RemoteCampaignRecord::default(),
        }
    }

    /// Last successful stage; unchanged by a failure.
    pub fn furthest(&self) -> CreationStage {
        self.furthest
    }

    pub fn record(&self) -> &RemoteCampaignRecord {
        &self.record
    }

    /// The stage the attempt is currently working towards.
    pub fn pending_step(&self) -> Option<CreationStage> {
        self.stage.next()
    }

    pub fn can_transition(&self, to: CreationStage) -> bool {
        match to {
            CreationStage::Failed => !self.stage.is_terminal(),
            _ => self.stage.next() == Some(to),
        }
    }

    fn advance(&mut self, to: CreationStage) -> CampaignResult<()> {
        if !self.can_transition(to) {
            return Err(CampaignError::Internal(anyhow!(
                "Invalid creation transition from {} to {}",
                self.stage,
                to
            )));
        }
        self.stage = to;
        if to != CreationStage::Failed {
            self.furthest = to;
        }
        Ok(())
    }

    pub fn record_campaign(&mut self, id: String) -> CampaignResult<()> {
        self.advance(CreationStage::CampaignCreated)?;
        self.record.campaign_id = Some(id);
        Ok(())
    }

    pub fn record_ad_set(&mut self, id: String) -> CampaignResult<()> {
        self.advance(CreationStage::AdSetCreated)?;
        self.record.ad_set_id = Some(id);
        Ok(())
    }

    pub fn record_creative(&mut self, id: String) -> CampaignResult<()> {
        self.advance(CreationStage::CreativeCreated)?;
        self.record.creative_id = Some(id);
        Ok(())
    }

    pub fn record_ad(&mut self, id: String) -> CampaignResult<()> {
        self.advance(CreationStage::AdCreated)?;
        self.record.ad_id = Some(id);
        Ok(())
    }

    pub fn mark_persisted(&mut self) -> CampaignResult<()> {
        self.advance(CreationStage::Persisted)
    }

    /// Move to `FAILED`. Returns the furthest stage reached; a no-op on an
    /// attempt that already ended.
    pub fn fail(&mut self) -> CreationStage {
        if self.can_transition(CreationStage::Failed) {
            self.stage = CreationStage::Failed;
        }
        self.furthest
    }
}

impl Default for CreationAttempt {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_chain() {
        let mut attempt = CreationAttempt::new();
        assert_eq!(attempt.pending_step(), Some(CreationStage::CampaignCreated));

        attempt.record_campaign("c1".into()).unwrap();
        attempt.record_ad_set("s1".into()).unwrap();
        attempt.record_creative("cr1".into()).unwrap();
        attempt.record_ad("a1".into()).unwrap();
        assert_eq!(attempt.record().created_objects().len(), 4);

        attempt.mark_persisted().unwrap();
        assert_eq!(attempt.furthest(), CreationStage::Persisted);
        assert_eq!(attempt.pending_step(), None);
        assert!(!attempt.can_transition(CreationStage::Failed));
    }

    #[test]
    fn test_out_of_order_rejected() {
        let mut attempt = CreationAttempt::new();
        assert!(attempt.record_ad_set("s1".into()).is_err());
        assert!(attempt.mark_persisted().is_err());
        assert_eq!(attempt.pending_step(), Some(CreationStage::CampaignCreated));
        assert!(attempt.record().ad_set_id.is_none());
    }

    #[test]
    fn test_failure_keeps_furthest_stage() {
        let mut attempt = CreationAttempt::new();
        attempt.record_campaign("c1".into()).unwrap();
        attempt.record_ad_set("s1".into()).unwrap();

        assert_eq!(attempt.pending_step(), Some(CreationStage::CreativeCreated));
        assert_eq!(attempt.fail(), CreationStage::AdSetCreated);
        assert_eq!(attempt.pending_step(), None);
        assert_eq!(
            attempt.record().created_objects(),
            vec![("campaign", "c1"), ("ad_set", "s1")]
        );
    }

    #[test]
    fn test_no_way_back_from_terminal() {
        let mut attempt = CreationAttempt::new();
        attempt.fail();
        assert!(attempt.record_campaign("c1".into()).is_err());
        assert!(!attempt.can_transition(CreationStage::Failed));
        assert_eq!(attempt.fail(), CreationStage::Start);
    }
}
