//! IMSI-substring auto-association.
//!
//! `EventBus` callbacks only get `(BsId, Rnti)` -- they have no RIB
//! access, because the bus is meant to stay decoupled from any one
//! subscriber's needs. [`AutoAssocQueue`] bridges that: a callback
//! registered via [`AutoAssocQueue::subscriber`] just records which UE
//! changed, and [`AutoAssociationApp`], running as an ordinary per-tick
//! app with full RIB access, drains the queue and applies matching
//! rules. [`AutoAssocRules`] is shared the same way so the northbound
//! API can replace the rule table and immediately re-queue every
//! connected UE for re-evaluation against it.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use ranctl_events::EventBus;
use ranctl_net::NetworkInterface;
use ranctl_rib::Rib;
use ranctl_types::{BsId, Imsi, Rnti, SliceId};

use crate::error::RrmError;
use crate::ue_slice;

/// Parse a bracketed, comma-separated list of (optionally quoted) IMSI
/// substrings, e.g. `[001, "002"]`. Matches `rrm_management.cc`'s
/// `split`/`begin_end_space` helpers: substrings must be digits only,
/// quotes must be balanced, empty entries are dropped.
fn parse_policy(s: &str) -> Result<Vec<String>, RrmError> {
    let trimmed = s.trim();
    let Some(inner) = trimmed.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) else {
        return Err(RrmError::InvalidArgument("expected '[' and ']'".to_string()));
    };
    let mut out = Vec::new();
    for raw in inner.split(',') {
        let token = raw.trim();
        if token.is_empty() {
            continue;
        }
        let starts_quote = token.starts_with('"');
        let ends_quote = token.ends_with('"');
        if starts_quote != ends_quote {
            return Err(RrmError::InvalidArgument("unbalanced \"\"".to_string()));
        }
        let token = if starts_quote { token.trim_matches('"') } else { token };
        if token.chars().any(char::is_alphabetic) {
            return Err(RrmError::InvalidArgument(format!("alpha character detected in {token}")));
        }
        if !token.is_empty() {
            out.push(token.to_string());
        }
    }
    Ok(out)
}

/// One auto-association rule: a UE whose IMSI contains `substring` is
/// pinned to `dl_slice_id`/`ul_slice_id`. Either direction left `None`
/// is not touched for a matching UE. Rules are matched in order; the
/// first match wins.
#[derive(Debug, Clone)]
pub struct AutoAssocRule {
    /// Substring matched against the UE's IMSI, as decimal digits.
    pub substring: String,
    /// DL slice the matching UE is pinned to, if this rule targets DL.
    pub dl_slice_id: Option<SliceId>,
    /// UL slice the matching UE is pinned to, if this rule targets UL.
    pub ul_slice_id: Option<SliceId>,
}

/// Shared, swappable rule table.
#[derive(Debug, Clone, Default)]
pub struct AutoAssocRules(Arc<Mutex<Vec<AutoAssocRule>>>);

impl AutoAssocRules {
    /// An empty rule table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole rule table.
    pub fn replace(&self, rules: Vec<AutoAssocRule>) {
        if let Ok(mut current) = self.0.lock() {
            *current = rules;
        }
    }

    /// Register a bracketed IMSI-substring policy against the given
    /// per-direction slice ids. Any earlier rule targeting the same
    /// slice id on a direction this registration also targets is
    /// dropped first, matching the source's "re-add and immediately
    /// re-associate" replacement behavior.
    ///
    /// # Errors
    ///
    /// Returns [`RrmError::InvalidArgument`] if `policy` is not a
    /// well-formed bracketed list.
    pub fn register(
        &self,
        policy: &str,
        dl_slice_id: Option<SliceId>,
        ul_slice_id: Option<SliceId>,
    ) -> Result<(), RrmError> {
        let substrings = parse_policy(policy)?;
        let Ok(mut current) = self.0.lock() else { return Ok(()) };
        current.retain(|r| {
            !(dl_slice_id.is_some() && r.dl_slice_id == dl_slice_id)
                && !(ul_slice_id.is_some() && r.ul_slice_id == ul_slice_id)
        });
        current.extend(
            substrings.into_iter().map(|substring| AutoAssocRule { substring, dl_slice_id, ul_slice_id }),
        );
        Ok(())
    }

    fn snapshot(&self) -> Vec<AutoAssocRule> {
        self.0.lock().map(|rules| rules.clone()).unwrap_or_default()
    }
}

/// Shared notification queue bridging the event bus to the tick loop.
#[derive(Debug, Clone, Default)]
pub struct AutoAssocQueue(Arc<Mutex<VecDeque<(BsId, Rnti)>>>);

impl AutoAssocQueue {
    /// An empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// A callback suitable for `EventBus::subscribe_ue_connect` or
    /// `subscribe_ue_update`.
    pub fn subscriber(&self) -> impl FnMut(BsId, Rnti) + Send + 'static {
        let queue = Arc::clone(&self.0);
        move |bs_id, rnti| {
            if let Ok(mut queue) = queue.lock() {
                queue.push_back((bs_id, rnti));
            }
        }
    }

    /// Queue every currently-connected UE for re-evaluation, used right
    /// after a rule-table replacement.
    pub fn enqueue_all(&self, rib: &Rib) {
        let Ok(mut queue) = self.0.lock() else { return };
        for bs_id in rib.available_bs() {
            if let Some(bs) = rib.get_bs(bs_id) {
                for ue in bs.ues() {
                    queue.push_back((bs_id, ue.rnti));
                }
            }
        }
    }

    fn drain(&self) -> Vec<(BsId, Rnti)> {
        self.0.lock().map(|mut queue| queue.drain(..).collect()).unwrap_or_default()
    }
}

fn matching_slice(rules: &[AutoAssocRule], imsi: Imsi) -> Option<(Option<SliceId>, Option<SliceId>)> {
    let imsi_str = imsi.0.to_string();
    rules.iter().find(|r| imsi_str.contains(&r.substring)).map(|r| (r.dl_slice_id, r.ul_slice_id))
}

/// Per-tick app applying auto-association rules to queued UE events.
pub struct AutoAssociationApp {
    queue: AutoAssocQueue,
    rules: AutoAssocRules,
}

impl AutoAssociationApp {
    /// Build an app over a shared queue and rule table, both owned
    /// jointly with the northbound API that wires subscriptions and rule
    /// replacement.
    pub fn new(queue: AutoAssocQueue, rules: AutoAssocRules) -> Self {
        Self { queue, rules }
    }
}

impl ranctl_scheduler::TickApp for AutoAssociationApp {
    fn name(&self) -> &str {
        "rrm-auto-association"
    }

    fn run(
        &mut self,
        rib: &mut Rib,
        net: &NetworkInterface,
        _bus: &mut EventBus,
        _now_ms: u64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let rules = self.rules.snapshot();
        if rules.is_empty() {
            return Ok(());
        }
        for (bs_id, rnti) in self.queue.drain() {
            let Some(bs) = rib.get_bs(bs_id) else { continue };
            let Some(ue) = bs.ue(rnti) else { continue };
            let Some(imsi) = ue.imsi else { continue };
            let Some((dl_slice_id, ul_slice_id)) = matching_slice(&rules, imsi) else { continue };
            let dl_changes = dl_slice_id.is_some_and(|id| id != ue.dl_slice_id);
            let ul_changes = ul_slice_id.is_some_and(|id| id != ue.ul_slice_id);
            if !dl_changes && !ul_changes {
                continue;
            }
            if let Err(e) = ue_slice::associate(rib, net, bs_id, rnti, dl_slice_id, ul_slice_id) {
                tracing::warn!(%bs_id, %rnti, error = %e, "auto-association failed");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_matching_rule_wins() {
        let rules = vec![
            AutoAssocRule {
                substring: "001010".to_string(),
                dl_slice_id: Some(SliceId(1)),
                ul_slice_id: Some(SliceId(1)),
            },
            AutoAssocRule {
                substring: "01".to_string(),
                dl_slice_id: Some(SliceId(2)),
                ul_slice_id: Some(SliceId(2)),
            },
        ];
        assert_eq!(
            matching_slice(&rules, Imsi(208_001_010_000_001)),
            Some((Some(SliceId(1)), Some(SliceId(1))))
        );
    }

    #[test]
    fn no_match_returns_none() {
        let rules = vec![AutoAssocRule {
            substring: "999".to_string(),
            dl_slice_id: Some(SliceId(1)),
            ul_slice_id: Some(SliceId(1)),
        }];
        assert_eq!(matching_slice(&rules, Imsi(208_001_010_000_001)), None);
    }

    #[test]
    fn dl_only_rule_leaves_ul_unset() {
        let rules =
            vec![AutoAssocRule { substring: "01".to_string(), dl_slice_id: Some(SliceId(4)), ul_slice_id: None }];
        assert_eq!(matching_slice(&rules, Imsi(208_001_010_000_001)), Some((Some(SliceId(4)), None)));
    }

    #[test]
    fn parse_policy_accepts_quoted_and_bare_digits() {
        let Ok(parsed) = parse_policy("[001, \"002\"]") else {
            return assert!(false, "expected parse to succeed");
        };
        assert_eq!(parsed, vec!["001".to_string(), "002".to_string()]);
    }

    #[test]
    fn parse_policy_rejects_missing_brackets() {
        assert!(parse_policy("001,002").is_err());
    }

    #[test]
    fn register_replaces_rules_for_the_same_slice_id() {
        let rules = AutoAssocRules::new();
        if rules.register("[001]", Some(SliceId(1)), None).is_err() {
            return assert!(false, "expected first registration to succeed");
        }
        if rules.register("[002]", Some(SliceId(1)), None).is_err() {
            return assert!(false, "expected second registration to succeed");
        }
        let snapshot = rules.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].substring, "002");
    }

    #[test]
    fn queue_and_rules_are_cheaply_shared() {
        let rules = AutoAssocRules::new();
        let clone = rules.clone();
        rules.replace(vec![AutoAssocRule {
            substring: "1".to_string(),
            dl_slice_id: Some(SliceId(3)),
            ul_slice_id: Some(SliceId(3)),
        }]);
        assert_eq!(clone.snapshot().len(), 1);
    }
}
