use std::cmp::Ordering;

use ilcone_core::{
    utils::math::{delta_r, map_angle_m_pi_to_pi},
    IlconeError, IlconeResult, Recombination, Vec4,
};
use log::debug;
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::jet::Jet;

/// The maximum number of axis updates while looking for a stable cone.
const MAX_CONE_ITERATIONS: usize = 50;
/// A cone is stable once its axis moves by less than this in $`(y, \phi)`$.
const CONE_TOLERANCE: f64 = 1e-5;

/// Parameters of the D0 Run II "improved legacy" cone algorithm.
///
/// The [`Default`] is the D0 Run II configuration with $`R = 0.7`$, see
/// [`ILConeConfig::d0_run2`]. Every field has a `with_*` setter.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ILConeConfig {
    /// The cone radius $`R`$ in $`(y, \phi)`$.
    pub cone_radius: f64,
    /// The minimum $`p_T`$ of a returned jet.
    pub min_jet_et: f64,
    /// Two overlapping protojets are merged when their shared $`p_T`$ exceeds this fraction of
    /// the softer one's $`p_T`$, and split otherwise.
    pub split_ratio: f64,
    /// A seed closer than `far_ratio * cone_radius` to an existing protojet is skipped.
    pub far_ratio: f64,
    /// Stable cones softer than `et_min_ratio * min_jet_et` are discarded.
    pub et_min_ratio: f64,
    /// Whether nearly identical protojets are removed.
    pub kill_duplicate: bool,
    /// $`\Delta R`$ below which two protojets may be duplicates.
    pub duplicate_dr: f64,
    /// Absolute $`\Delta p_T`$ (GeV) below which two protojets may be duplicates.
    pub duplicate_dpt: f64,
    /// Seeds are first stabilised in a cone of radius `cone_radius / search_factor`.
    pub search_factor: f64,
    /// No jets are returned when the hardest protojet is softer than this.
    pub pt_min_leading_protojet: f64,
    /// Protojets other than the hardest are dropped when softer than this.
    pub pt_min_second_protojet: f64,
    /// The maximum number of merges in a single event.
    pub merge_max: usize,
    /// Once `merge_max` merges have happened, overlapping protojets softer than this are dropped
    /// rather than split.
    pub pt_min_nomerge: f64,
    /// How protojet axes are computed.
    pub recombination: Recombination,
}

impl Default for ILConeConfig {
    fn default() -> Self {
        Self::d0_run2()
    }
}

impl ILConeConfig {
    /// The D0 Run II cone (JCCA) configuration with $`R = 0.7`$.
    pub fn d0_run2() -> Self {
        Self {
            cone_radius: 0.7,
            min_jet_et: 0.0,
            split_ratio: 0.5,
            far_ratio: 0.5,
            et_min_ratio: 0.5,
            kill_duplicate: true,
            duplicate_dr: 0.005,
            duplicate_dpt: 0.01,
            search_factor: 1.0,
            pt_min_leading_protojet: 0.0,
            pt_min_second_protojet: 0.0,
            merge_max: 10000,
            pt_min_nomerge: 0.0,
            recombination: Recombination::Energy,
        }
    }
    /// The configuration of the `D0ILConeJets` projection: the D0 Run II values with at most
    /// 1000 merges per event.
    pub fn d0_il_cone() -> Self {
        Self {
            merge_max: 1000,
            ..Self::d0_run2()
        }
    }
    /// The D0 Run II cone with a custom radius, minimum jet $`E_T`$ and split ratio.
    pub fn d0_run2_with(cone_radius: f64, min_jet_et: f64, split_ratio: f64) -> Self {
        Self {
            cone_radius,
            min_jet_et,
            split_ratio,
            ..Self::d0_run2()
        }
    }
    pub fn with_cone_radius(mut self, value: f64) -> Self {
        self.cone_radius = value;
        self
    }
    pub fn with_min_jet_et(mut self, value: f64) -> Self {
        self.min_jet_et = value;
        self
    }
    pub fn with_split_ratio(mut self, value: f64) -> Self {
        self.split_ratio = value;
        self
    }
    pub fn with_far_ratio(mut self, value: f64) -> Self {
        self.far_ratio = value;
        self
    }
    pub fn with_et_min_ratio(mut self, value: f64) -> Self {
        self.et_min_ratio = value;
        self
    }
    pub fn with_kill_duplicate(mut self, value: bool) -> Self {
        self.kill_duplicate = value;
        self
    }
    pub fn with_duplicate_dr(mut self, value: f64) -> Self {
        self.duplicate_dr = value;
        self
    }
    pub fn with_duplicate_dpt(mut self, value: f64) -> Self {
        self.duplicate_dpt = value;
        self
    }
    pub fn with_search_factor(mut self, value: f64) -> Self {
        self.search_factor = value;
        self
    }
    pub fn with_pt_min_leading_protojet(mut self, value: f64) -> Self {
        self.pt_min_leading_protojet = value;
        self
    }
    pub fn with_pt_min_second_protojet(mut self, value: f64) -> Self {
        self.pt_min_second_protojet = value;
        self
    }
    pub fn with_merge_max(mut self, value: usize) -> Self {
        self.merge_max = value;
        self
    }
    pub fn with_pt_min_nomerge(mut self, value: f64) -> Self {
        self.pt_min_nomerge = value;
        self
    }
    pub fn with_recombination(mut self, value: Recombination) -> Self {
        self.recombination = value;
        self
    }

    fn validate(&self) -> IlconeResult<()> {
        fn invalid(name: &str, value: f64, reason: &str) -> IlconeResult<()> {
            Err(IlconeError::InvalidParameter {
                name: name.to_string(),
                value,
                reason: reason.to_string(),
            })
        }
        if !(self.cone_radius.is_finite() && self.cone_radius > 0.0) {
            return invalid("cone_radius", self.cone_radius, "must be positive and finite");
        }
        if !(self.search_factor.is_finite() && self.search_factor > 0.0) {
            return invalid("search_factor", self.search_factor, "must be positive and finite");
        }
        if !(self.split_ratio > 0.0 && self.split_ratio <= 1.0) {
            return invalid("split_ratio", self.split_ratio, "must lie in (0, 1]");
        }
        for (name, value) in [
            ("far_ratio", self.far_ratio),
            ("et_min_ratio", self.et_min_ratio),
            ("duplicate_dr", self.duplicate_dr),
            ("duplicate_dpt", self.duplicate_dpt),
        ] {
            if !(value >= 0.0) {
                return invalid(name, value, "must not be negative");
            }
        }
        for (name, value) in [
            ("min_jet_et", self.min_jet_et),
            ("pt_min_leading_protojet", self.pt_min_leading_protojet),
            ("pt_min_second_protojet", self.pt_min_second_protojet),
            ("pt_min_nomerge", self.pt_min_nomerge),
        ] {
            if value.is_nan() {
                return invalid(name, value, "must be a number");
            }
        }
        Ok(())
    }
}

/// A clusterable input: its four-vector and cached collider coordinates.
#[derive(Copy, Clone, Debug)]
struct Item {
    index: usize,
    p4: Vec4,
    pt: f64,
    y: f64,
    phi: f64,
}

/// A candidate jet during clustering. `members` index the accepted items, ascending.
#[derive(Clone, Debug)]
struct ProtoJet {
    members: Vec<usize>,
    pt: f64,
    y: f64,
    phi: f64,
}

fn by_pt_desc(a: &ProtoJet, b: &ProtoJet) -> Ordering {
    b.pt.total_cmp(&a.pt)
}

fn shares_members(a: &[usize], b: &[usize]) -> bool {
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => return true,
        }
    }
    false
}

/// The D0 Run II improved legacy cone algorithm.
///
/// Clustering proceeds in four stages:
/// 1. every accepted item seeds a cone (hardest first) which is iterated until its axis is
///    stable, skipping seeds that fall near an already-found cone,
/// 2. further cones are started at the $`p_T`$-weighted midpoints of nearby pairs of stable
///    cones,
/// 3. identical and near-duplicate protojets are removed and the leading/second protojet
///    thresholds applied,
/// 4. overlapping protojets are merged or split until no item is shared.
///
/// Distances are measured in the $`(y, \phi)`$ plane and the returned jet four-vectors are
/// always the plain sum of their constituents, whatever [`Recombination`] is used for the
/// axes during clustering.
///
/// # Examples
///
/// ```
/// use ilcone_core::Vec4;
/// use ilcone_jets::{ILConeAlgorithm, ILConeConfig};
///
/// let algorithm = ILConeAlgorithm::new(ILConeConfig::d0_run2()).unwrap();
/// let items = vec![
///     Vec4::from_pt_y_phi_m(40.0, 0.1, 0.0, 0.0),
///     Vec4::from_pt_y_phi_m(30.0, 0.0, 0.2, 0.0),
///     Vec4::from_pt_y_phi_m(50.0, -0.5, 3.0, 0.0),
/// ];
/// let jets = algorithm.cluster(&items, 0.0);
/// assert_eq!(jets.len(), 2);
/// assert_eq!(jets[0].constituents, vec![0, 1]);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ILConeAlgorithm {
    config: ILConeConfig,
}

impl Default for ILConeAlgorithm {
    fn default() -> Self {
        Self {
            config: ILConeConfig::d0_run2(),
        }
    }
}

impl ILConeAlgorithm {
    /// The algorithm with the [`ILConeConfig::d0_il_cone`] configuration.
    pub fn d0_il_cone() -> Self {
        Self {
            config: ILConeConfig::d0_il_cone(),
        }
    }
    /// Create a new algorithm after checking the configuration.
    pub fn new(config: ILConeConfig) -> IlconeResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ILConeConfig {
        &self.config
    }

    /// Cluster `items` into jets. Items with $`p_T`$ below `et_threshold` do not take part.
    ///
    /// Jets are returned in decreasing $`p_T`$, and each accepted item belongs to at most one
    /// jet. The output depends only on the inputs, so repeated calls give identical results.
    pub fn cluster(&self, items: &[Vec4], et_threshold: f64) -> Vec<Jet> {
        let accepted = self.accept(items, et_threshold);
        if accepted.is_empty() {
            return vec![];
        }
        let seeds = self.seed_cones(&accepted);
        let n_seeded = seeds.len();
        let mut protojets = self.midpoint_cones(&accepted, &seeds);
        let n_midpoints = protojets.len();
        protojets.splice(0..0, seeds);
        let protojets = self.remove_duplicates(protojets);
        let protojets = self.apply_protojet_thresholds(protojets);
        let jets = self.split_merge(&accepted, protojets);
        let jets = self.fold_final_duplicates(&accepted, jets);
        debug!(
            "ILCone: {} items accepted of {}, {} seed cones, {} midpoint cones, {} jets",
            accepted.len(),
            items.len(),
            n_seeded,
            n_midpoints,
            jets.len()
        );
        jets.into_iter()
            .map(|pj| {
                let constituents = pj.members.iter().map(|&m| accepted[m].index).collect();
                Jet::from_constituents(items, constituents)
            })
            .collect()
    }

    /// Cluster several independent events with the same threshold, returning the jets of each
    /// event in input order.
    pub fn cluster_many(&self, events: &[Vec<Vec4>], et_threshold: f64) -> Vec<Vec<Jet>> {
        #[cfg(feature = "rayon")]
        {
            events
                .par_iter()
                .map(|items| self.cluster(items, et_threshold))
                .collect()
        }
        #[cfg(not(feature = "rayon"))]
        {
            events
                .iter()
                .map(|items| self.cluster(items, et_threshold))
                .collect()
        }
    }

    fn accept(&self, items: &[Vec4], et_threshold: f64) -> Vec<Item> {
        items
            .iter()
            .enumerate()
            .filter_map(|(index, p4)| {
                let pt = p4.pt();
                let y = p4.rapidity();
                let phi = p4.phi();
                if pt > 0.0 && pt >= et_threshold && y.is_finite() && phi.is_finite() {
                    Some(Item {
                        index,
                        p4: *p4,
                        pt,
                        y,
                        phi,
                    })
                } else {
                    None
                }
            })
            .collect()
    }

    fn axis(&self, items: &[Item], members: &[usize]) -> (Vec4, f64, f64) {
        let p4: Vec4 = members.iter().map(|&m| items[m].p4).sum();
        if self.config.recombination == Recombination::Energy {
            let y = p4.rapidity();
            if y.is_finite() {
                return (p4, y, p4.phi());
            }
        }
        // pT-weighted axis, with azimuths taken relative to the first member
        let phi_ref = items[members[0]].phi;
        let (mut sum_pt, mut sum_y, mut sum_dphi) = (0.0, 0.0, 0.0);
        for &m in members {
            let item = &items[m];
            sum_pt += item.pt;
            sum_y += item.pt * item.y;
            sum_dphi += item.pt * map_angle_m_pi_to_pi(item.phi - phi_ref);
        }
        (
            p4,
            sum_y / sum_pt,
            map_angle_m_pi_to_pi(phi_ref + sum_dphi / sum_pt),
        )
    }

    fn protojet(&self, items: &[Item], members: Vec<usize>) -> ProtoJet {
        let (p4, y, phi) = self.axis(items, &members);
        ProtoJet {
            members,
            pt: p4.pt(),
            y,
            phi,
        }
    }

    fn cone_members(items: &[Item], y: f64, phi: f64, radius: f64) -> Vec<usize> {
        items
            .iter()
            .enumerate()
            .filter(|(_, item)| delta_r(item.y, item.phi, y, phi) <= radius)
            .map(|(m, _)| m)
            .collect()
    }

    /// Iterate a cone of the given radius from `(y, phi)` until its axis stops moving.
    fn stable_cone(&self, items: &[Item], y: f64, phi: f64, radius: f64) -> Option<ProtoJet> {
        let (mut y, mut phi) = (y, phi);
        let mut cone = None;
        for _ in 0..MAX_CONE_ITERATIONS {
            let members = Self::cone_members(items, y, phi, radius);
            if members.is_empty() {
                return None;
            }
            let pj = self.protojet(items, members);
            let shift = delta_r(y, phi, pj.y, pj.phi);
            y = pj.y;
            phi = pj.phi;
            cone = Some(pj);
            if shift < CONE_TOLERANCE {
                break;
            }
        }
        cone
    }

    fn search_and_stabilise(&self, items: &[Item], y: f64, phi: f64) -> Option<ProtoJet> {
        let radius = self.config.cone_radius;
        if self.config.search_factor == 1.0 {
            return self.stable_cone(items, y, phi, radius);
        }
        let searched = self.stable_cone(items, y, phi, radius / self.config.search_factor)?;
        self.stable_cone(items, searched.y, searched.phi, radius)
    }

    fn min_cone_pt(&self) -> f64 {
        self.config.et_min_ratio * self.config.min_jet_et
    }

    fn seed_cones(&self, items: &[Item]) -> Vec<ProtoJet> {
        let mut order: Vec<usize> = (0..items.len()).collect();
        // stable sort keeps input order among equal pT
        order.sort_by(|&a, &b| items[b].pt.total_cmp(&items[a].pt));
        let far = self.config.far_ratio * self.config.cone_radius;
        let mut cones: Vec<ProtoJet> = Vec::new();
        for seed in order.into_iter().map(|s| &items[s]) {
            if cones
                .iter()
                .any(|pj| delta_r(seed.y, seed.phi, pj.y, pj.phi) < far)
            {
                continue;
            }
            if let Some(pj) = self.search_and_stabilise(items, seed.y, seed.phi) {
                if pj.pt >= self.min_cone_pt() {
                    cones.push(pj);
                }
            }
        }
        cones
    }

    fn midpoint_cones(&self, items: &[Item], seeds: &[ProtoJet]) -> Vec<ProtoJet> {
        let two_r = 2.0 * self.config.cone_radius;
        let mut cones = Vec::new();
        for (i, a) in seeds.iter().enumerate() {
            for b in &seeds[i + 1..] {
                if delta_r(a.y, a.phi, b.y, b.phi) >= two_r {
                    continue;
                }
                let sum_pt = a.pt + b.pt;
                if sum_pt <= 0.0 {
                    continue;
                }
                let y = (a.pt * a.y + b.pt * b.y) / sum_pt;
                let phi =
                    map_angle_m_pi_to_pi(a.phi + b.pt / sum_pt * map_angle_m_pi_to_pi(b.phi - a.phi));
                if let Some(pj) = self.stable_cone(items, y, phi, self.config.cone_radius) {
                    if pj.pt >= self.min_cone_pt() {
                        cones.push(pj);
                    }
                }
            }
        }
        cones
    }

    fn is_duplicate(&self, a: &ProtoJet, b: &ProtoJet) -> bool {
        delta_r(a.y, a.phi, b.y, b.phi) < self.config.duplicate_dr
            && (a.pt - b.pt).abs() < self.config.duplicate_dpt
    }

    fn remove_duplicates(&self, mut protojets: Vec<ProtoJet>) -> Vec<ProtoJet> {
        protojets.sort_by(by_pt_desc);
        let mut kept: Vec<ProtoJet> = Vec::with_capacity(protojets.len());
        for pj in protojets {
            let redundant = kept.iter().any(|k| {
                k.members == pj.members || (self.config.kill_duplicate && self.is_duplicate(k, &pj))
            });
            if !redundant {
                kept.push(pj);
            }
        }
        kept
    }

    fn apply_protojet_thresholds(&self, protojets: Vec<ProtoJet>) -> Vec<ProtoJet> {
        match protojets.first() {
            None => vec![],
            Some(leading) if leading.pt < self.config.pt_min_leading_protojet => vec![],
            Some(_) => protojets
                .into_iter()
                .enumerate()
                .filter(|(i, pj)| *i == 0 || pj.pt >= self.config.pt_min_second_protojet)
                .map(|(_, pj)| pj)
                .collect(),
        }
    }

    fn split_merge(&self, items: &[Item], mut pending: Vec<ProtoJet>) -> Vec<ProtoJet> {
        let mut jets = Vec::new();
        let mut n_merges = 0;
        while !pending.is_empty() {
            pending.sort_by(by_pt_desc);
            let neighbour = (1..pending.len())
                .find(|&k| shares_members(&pending[0].members, &pending[k].members));
            let Some(k) = neighbour else {
                let pj = pending.remove(0);
                if pj.pt >= self.config.min_jet_et {
                    jets.push(pj);
                }
                continue;
            };
            let shared_pt: f64 = pending[0]
                .members
                .iter()
                .filter(|&&m| pending[k].members.binary_search(&m).is_ok())
                .map(|&m| items[m].pt)
                .sum();
            let neighbour_pt = pending[k].pt;
            if n_merges >= self.config.merge_max {
                if neighbour_pt < self.config.pt_min_nomerge {
                    pending.remove(k);
                } else {
                    self.split(items, &mut pending, k);
                }
            } else if shared_pt > self.config.split_ratio * neighbour_pt {
                let absorbed = pending.remove(k);
                let mut members = std::mem::take(&mut pending[0].members);
                members.extend(absorbed.members);
                members.sort_unstable();
                members.dedup();
                pending[0] = self.protojet(items, members);
                n_merges += 1;
            } else {
                self.split(items, &mut pending, k);
            }
        }
        jets.sort_by(by_pt_desc);
        jets
    }

    /// Give each item shared by `pending[0]` and `pending[k]` to the nearer axis (ties to the
    /// harder protojet). Protojets left empty are dropped.
    fn split(&self, items: &[Item], pending: &mut Vec<ProtoJet>, k: usize) {
        let (hard, soft) = (&pending[0], &pending[k]);
        let mut hard_members = Vec::with_capacity(hard.members.len());
        let mut soft_members = soft.members.clone();
        for &m in &hard.members {
            if soft.members.binary_search(&m).is_err() {
                hard_members.push(m);
                continue;
            }
            let item = &items[m];
            let d_hard = delta_r(item.y, item.phi, hard.y, hard.phi);
            let d_soft = delta_r(item.y, item.phi, soft.y, soft.phi);
            if d_hard <= d_soft {
                hard_members.push(m);
                soft_members.retain(|&s| s != m);
            }
        }
        if soft_members.is_empty() {
            pending.remove(k);
        } else {
            pending[k] = self.protojet(items, soft_members);
        }
        if hard_members.is_empty() {
            pending.remove(0);
        } else {
            pending[0] = self.protojet(items, hard_members);
        }
    }

    fn fold_final_duplicates(&self, items: &[Item], mut jets: Vec<ProtoJet>) -> Vec<ProtoJet> {
        if !self.config.kill_duplicate {
            return jets;
        }
        'fold: loop {
            for i in 0..jets.len() {
                for j in (i + 1)..jets.len() {
                    if self.is_duplicate(&jets[i], &jets[j]) {
                        let absorbed = jets.remove(j);
                        let mut members = std::mem::take(&mut jets[i].members);
                        members.extend(absorbed.members);
                        members.sort_unstable();
                        jets[i] = self.protojet(items, members);
                        jets.sort_by(by_pt_desc);
                        continue 'fold;
                    }
                }
            }
            break;
        }
        jets
    }
}
