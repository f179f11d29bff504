// Boundary markers.
//
// A rule that mentions the initial or final boundary marker is compiled
// over strings bracketed by those markers. The inserter adds them around the
// input and the deleter strips them from the output. The deleter also drops
// anything the rule produced outside the markers: an unconstrained insertion
// rule would otherwise insert before the initial marker and after the final
// one, and an obligatory application would then have no output at all.

use cdrewrite_core::RewriteOptions;
use cdrewrite_fst::optimize::optimize;
use cdrewrite_fst::properties::contains_label;
use cdrewrite_fst::rational::{concat, prepend};
use cdrewrite_fst::transform::{SortType, arc_sort, map_labels};
use cdrewrite_fst::{EPSILON, FstError, Label, Semiring, VectorFst};

use crate::marker::{MarkerPair, add_markers_to_sigma};

/// The boundary markers a rule actually uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoundaryMarkers {
    pub initial: Option<Label>,
    pub final_: Option<Label>,
}

impl BoundaryMarkers {
    /// The initial marker is used when `phi` or `lambda` mentions it, and the
    /// final marker when `phi` or `rho` does.
    pub fn detect<W: Semiring>(
        options: &RewriteOptions,
        phi: &VectorFst<W>,
        lambda: &VectorFst<W>,
        rho: &VectorFst<W>,
    ) -> Self {
        let initial = options
            .initial_boundary_marker
            .filter(|&m| contains_label(lambda, m) || contains_label(phi, m));
        let final_ = options
            .final_boundary_marker
            .filter(|&m| contains_label(rho, m) || contains_label(phi, m));
        Self { initial, final_ }
    }

    pub fn is_active(&self) -> bool {
        self.initial.is_some() || self.final_.is_some()
    }

    /// Identity pairs for the active markers, for extending `sigma`.
    pub fn identity_pairs(&self) -> Vec<MarkerPair> {
        self.initial
            .iter()
            .chain(self.final_.iter())
            .map(|&m| (m, m))
            .collect()
    }

    /// Extend `sigma*` so the active markers may occur anywhere.
    pub fn extend_sigma<W: Semiring>(&self, sigma: &mut VectorFst<W>) {
        add_markers_to_sigma(sigma, &self.identity_pairs());
    }

    /// `ε:initial · sigma* · ε:final`, sorted by output label.
    pub fn inserter<W: Semiring>(&self, sigma: &VectorFst<W>) -> Result<VectorFst<W>, FstError> {
        let mut fst = self.bracket(sigma, false);
        optimize(&mut fst)?;
        arc_sort(&mut fst, SortType::OLabel);
        Ok(fst)
    }

    /// `initial:ε · sigma* · final:ε`, also deleting whatever precedes the
    /// initial marker or follows the final one. Sorted by input label.
    pub fn deleter<W: Semiring>(&self, sigma: &VectorFst<W>) -> Result<VectorFst<W>, FstError> {
        let mut fst = self.bracket(sigma, true);
        if self.is_active() {
            let mut del_sigma = sigma.clone();
            map_labels(&mut del_sigma, |il, _| (il, EPSILON));
            if self.initial.is_some() {
                prepend(&mut fst, &del_sigma);
            }
            if self.final_.is_some() {
                concat(&mut fst, &del_sigma);
            }
        }
        optimize(&mut fst)?;
        arc_sort(&mut fst, SortType::ILabel);
        Ok(fst)
    }

    fn bracket<W: Semiring>(&self, sigma: &VectorFst<W>, delete: bool) -> VectorFst<W> {
        let side = |marker: Option<Label>| -> VectorFst<W> {
            match marker {
                Some(m) if delete => VectorFst::from_label_pairs(&[m], &[]),
                Some(m) => VectorFst::from_label_pairs(&[], &[m]),
                None => VectorFst::epsilon(),
            }
        };
        let mut fst = side(self.initial);
        concat(&mut fst, sigma);
        concat(&mut fst, &side(self.final_));
        fst
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdrewrite_fst::compose::compose;
    use cdrewrite_fst::paths::string_pairs;
    use cdrewrite_fst::rational::{ClosureType, closure};
    use cdrewrite_fst::TropicalWeight;

    type Fst = VectorFst<TropicalWeight>;

    const A: Label = 1;
    const B: Label = 2;
    const BOS: Label = 10;
    const EOS: Label = 11;

    fn sigma_star() -> Fst {
        let mut sigma = Fst::from_alphabet([A, B]);
        closure(&mut sigma, ClosureType::Star);
        sigma
    }

    fn both() -> BoundaryMarkers {
        BoundaryMarkers {
            initial: Some(BOS),
            final_: Some(EOS),
        }
    }

    fn outputs(fst: &Fst, input: &[Label]) -> Vec<Vec<Label>> {
        let mut out: Vec<_> = string_pairs(&compose(&Fst::from_labels(input), fst))
            .unwrap()
            .into_iter()
            .map(|p| p.1)
            .collect();
        out.sort();
        out.dedup();
        out
    }

    #[test]
    fn detect_only_referenced_markers() {
        let options = RewriteOptions::default().with_boundary_markers(BOS, EOS);
        let phi = Fst::from_labels(&[A]);
        let lambda = Fst::from_labels(&[BOS]);
        let rho = Fst::epsilon();
        let found = BoundaryMarkers::detect(&options, &phi, &lambda, &rho);
        assert_eq!(found.initial, Some(BOS));
        assert_eq!(found.final_, None);
        assert!(found.is_active());

        let found = BoundaryMarkers::detect(&RewriteOptions::default(), &phi, &lambda, &rho);
        assert!(!found.is_active());
    }

    #[test]
    fn detect_marker_in_phi() {
        let options = RewriteOptions::default().with_boundary_markers(BOS, EOS);
        let phi = Fst::from_labels(&[A, EOS]);
        let found = BoundaryMarkers::detect(&options, &phi, &Fst::epsilon(), &Fst::epsilon());
        assert_eq!(found.final_, Some(EOS));
        assert_eq!(found.initial, None);
    }

    #[test]
    fn inserter_brackets_input() {
        let inserter = both().inserter(&sigma_star()).unwrap();
        assert_eq!(outputs(&inserter, &[A, B]), vec![vec![BOS, A, B, EOS]]);
        let only_final = BoundaryMarkers {
            initial: None,
            final_: Some(EOS),
        };
        let inserter = only_final.inserter(&sigma_star()).unwrap();
        assert_eq!(outputs(&inserter, &[A]), vec![vec![A, EOS]]);
    }

    #[test]
    fn deleter_strips_markers() {
        let deleter = both().deleter(&sigma_star()).unwrap();
        assert_eq!(outputs(&deleter, &[BOS, A, B, EOS]), vec![vec![A, B]]);
        assert!(outputs(&deleter, &[A, B]).is_empty());
    }

    #[test]
    fn deleter_drops_text_outside_markers() {
        let deleter = both().deleter(&sigma_star()).unwrap();
        assert_eq!(outputs(&deleter, &[B, BOS, A, EOS, B]), vec![vec![A]]);
    }

    #[test]
    fn identity_pairs_follow_active_markers() {
        assert_eq!(both().identity_pairs(), vec![(BOS, BOS), (EOS, EOS)]);
        assert!(BoundaryMarkers::default().identity_pairs().is_empty());
    }
}
