// RewriteRule: a context-dependent rewrite rule and its compiler.
//
// The rule owns its operands. Compilation validates them, folds any
// boundary markers the rule uses into sigma, allocates bracket labels above
// every label in play, then composes the plan for the rule's direction and
// mode. Every intermediate automaton is local to one `compile` call.

use cdrewrite_core::RewriteOptions;
use cdrewrite_fst::compose::{compose, cross};
use cdrewrite_fst::optimize::optimize;
use cdrewrite_fst::properties::{is_acceptor, is_unweighted_acceptor};
use cdrewrite_fst::transform::{ProjectType, SortType, arc_sort, project, rm_weights};
use cdrewrite_fst::{Semiring, VectorFst};
use log::{debug, warn};

use crate::boundary::BoundaryMarkers;
use crate::filter::make_filter;
use crate::labels::MarkerLabels;
use crate::marker::{add_markers_to_sigma, append_markers, ignore_markers, prepend_markers};
use crate::plan::{FilterSource, FilterStage, Stage, plan};
use crate::replace::{ReplaceWiring, make_replace};
use crate::{CompileError, Operand};

/// A rule `phi -> psi / lambda __ rho`.
#[derive(Debug, Clone)]
pub struct RewriteRule<W: Semiring> {
    /// What is rewritten. Unweighted acceptor.
    pub phi: VectorFst<W>,
    /// What it is rewritten to: a weighted acceptor, or the whole rewrite
    /// relation when `phi_cross_psi` is set.
    pub psi: VectorFst<W>,
    /// Left context. Unweighted acceptor.
    pub lambda: VectorFst<W>,
    /// Right context. Unweighted acceptor.
    pub rho: VectorFst<W>,
    pub phi_cross_psi: bool,
    pub options: RewriteOptions,
}

fn check_unweighted_acceptor<W: Semiring>(
    fst: &VectorFst<W>,
    operand: Operand,
) -> Result<(), CompileError> {
    if is_unweighted_acceptor(fst) {
        Ok(())
    } else {
        Err(CompileError::NotUnweightedAcceptor { operand })
    }
}

/// Working state of one compilation.
struct Compilation<'a, W: Semiring> {
    rule: &'a RewriteRule<W>,
    sigma: VectorFst<W>,
    sigma_rbrace: VectorFst<W>,
    markers: MarkerLabels,
}

impl<W: Semiring> Compilation<'_, W> {
    fn filter(&self, stage: &FilterStage) -> Result<VectorFst<W>, CompileError> {
        let rb = self.markers.rbrace;
        let mut fst = match stage.source {
            FilterSource::Lambda => make_filter(
                &self.rule.lambda,
                &self.sigma,
                stage.marker_type,
                &stage.markers,
                stage.reverse,
            )?,
            FilterSource::Rho => make_filter(
                &self.rule.rho,
                &self.sigma,
                stage.marker_type,
                &stage.markers,
                stage.reverse,
            )?,
            FilterSource::PhiThenClose | FilterSource::CloseThenPhi => {
                let mut beta = self.rule.phi.clone();
                ignore_markers(&mut beta, &[(rb, rb)]);
                if stage.source == FilterSource::PhiThenClose {
                    append_markers(&mut beta, &[(rb, rb)]);
                } else {
                    prepend_markers(&mut beta, &[(rb, rb)]);
                }
                make_filter(
                    &beta,
                    &self.sigma_rbrace,
                    stage.marker_type,
                    &stage.markers,
                    stage.reverse,
                )?
            }
        };
        if !stage.ignore.is_empty() {
            ignore_markers(&mut fst, &stage.ignore);
            arc_sort(&mut fst, SortType::ILabel);
        }
        Ok(fst)
    }

    fn replace(&self) -> Result<VectorFst<W>, CompileError> {
        let rule = self.rule;
        let tau = if rule.phi_cross_psi {
            rule.psi.clone()
        } else {
            cross(&rule.phi, &rule.psi)?
        };
        let wiring = ReplaceWiring::new(rule.options.direction, rule.options.mode, &self.markers);
        make_replace(tau, &self.sigma, &wiring)
    }
}

impl<W: Semiring> RewriteRule<W> {
    /// A left-to-right obligatory rule without boundary markers.
    pub fn new(phi: VectorFst<W>, psi: VectorFst<W>, lambda: VectorFst<W>, rho: VectorFst<W>) -> Self {
        Self {
            phi,
            psi,
            lambda,
            rho,
            phi_cross_psi: false,
            options: RewriteOptions::default(),
        }
    }

    /// A rule given by its rewrite relation `tau`; `phi` is the input
    /// projection of `tau` with weights removed.
    pub fn from_tau(
        tau: VectorFst<W>,
        lambda: VectorFst<W>,
        rho: VectorFst<W>,
    ) -> Result<Self, CompileError> {
        let mut phi = tau.clone();
        project(&mut phi, ProjectType::Input);
        rm_weights(&mut phi);
        optimize(&mut phi)?;
        Ok(Self::new(phi, tau, lambda, rho).with_phi_cross_psi(true))
    }

    pub fn with_phi_cross_psi(mut self, phi_cross_psi: bool) -> Self {
        self.phi_cross_psi = phi_cross_psi;
        self
    }

    pub fn with_options(mut self, options: RewriteOptions) -> Self {
        self.options = options;
        self
    }

    /// Check the operand preconditions.
    pub fn validate(&self, sigma: &VectorFst<W>) -> Result<(), CompileError> {
        check_unweighted_acceptor(&self.phi, Operand::Phi)?;
        check_unweighted_acceptor(&self.lambda, Operand::Lambda)?;
        check_unweighted_acceptor(&self.rho, Operand::Rho)?;
        if !self.phi_cross_psi && !is_acceptor(&self.psi) {
            return Err(CompileError::PsiNotAcceptor);
        }
        check_unweighted_acceptor(sigma, Operand::Sigma)
    }

    /// Compile the rule into a transducer over `sigma`, the closure of the
    /// alphabet.
    ///
    /// `sigma` must be the closure of a bifix code containing every symbol
    /// the rule and its inputs use. This is not checked.
    pub fn compile(&self, sigma: &VectorFst<W>) -> Result<VectorFst<W>, CompileError> {
        self.validate(sigma)?;

        let boundaries = BoundaryMarkers::detect(&self.options, &self.phi, &self.lambda, &self.rho);
        let mut mutable_sigma = sigma.clone();
        boundaries.extend_sigma(&mut mutable_sigma);

        let markers = MarkerLabels::allocate(
            &mutable_sigma,
            [&self.phi, &self.psi, &self.lambda, &self.rho],
        );
        debug!(
            "compile {} {}: rbrace={} lbrace1={} lbrace2={} boundaries={:?}",
            self.options.direction,
            self.options.mode,
            markers.rbrace,
            markers.lbrace1,
            markers.lbrace2,
            boundaries
        );

        let mut sigma_rbrace = mutable_sigma.clone();
        add_markers_to_sigma(&mut sigma_rbrace, &[(markers.rbrace, markers.rbrace)]);
        let compilation = Compilation {
            rule: self,
            sigma: mutable_sigma,
            sigma_rbrace,
            markers,
        };

        let mut result: Option<VectorFst<W>> = None;
        for stage in plan(self.options.direction, self.options.mode, &markers) {
            let fst = match &stage {
                Stage::Filter(filter) => compilation.filter(filter)?,
                Stage::Replace => compilation.replace()?,
            };
            result = Some(match result {
                None => fst,
                Some(prefix) => {
                    let composed = compose(&prefix, &fst);
                    debug!("compose {}: {} states", stage_name(&stage), composed.num_states());
                    composed
                }
            });
        }
        let mut fst = result.unwrap_or_default();

        if boundaries.is_active() {
            let inserter = boundaries.inserter(sigma)?;
            let deleter = boundaries.deleter(sigma)?;
            fst = compose(&compose(&inserter, &fst), &deleter);
        }

        optimize(&mut fst)?;
        arc_sort(&mut fst, SortType::ILabel);
        if fst.is_empty() {
            warn!("rewrite rule compiled to the empty relation");
        }
        debug!("compiled rule: {} states", fst.num_states());
        Ok(fst)
    }
}

fn stage_name(stage: &Stage) -> &'static str {
    match stage {
        Stage::Replace => "replace",
        Stage::Filter(f) => match f.source {
            FilterSource::Lambda => "lambda",
            FilterSource::Rho => "rho",
            FilterSource::PhiThenClose | FilterSource::CloseThenPhi => "phi",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdrewrite_core::{Direction, Mode};
    use cdrewrite_fst::paths::string_pairs;
    use cdrewrite_fst::rational::{ClosureType, closure, union};
    use cdrewrite_fst::{EPSILON, FstError, Label, StateId, Transition, TropicalWeight};

    type Fst = VectorFst<TropicalWeight>;

    const A: Label = 1;
    const B: Label = 2;

    fn sigma_star() -> Fst {
        let mut sigma = Fst::from_alphabet([A, B]);
        closure(&mut sigma, ClosureType::Star);
        sigma
    }

    fn outputs(rule: &Fst, input: &[Label]) -> Vec<Vec<Label>> {
        let mut out: Vec<_> = string_pairs(&compose(&Fst::from_labels(input), rule))
            .unwrap()
            .into_iter()
            .map(|p| p.1)
            .collect();
        out.sort();
        out.dedup();
        out
    }

    fn aa_to_b(direction: Direction, mode: Mode) -> Fst {
        RewriteRule::new(
            Fst::from_labels(&[A, A]),
            Fst::from_labels(&[B]),
            Fst::epsilon(),
            Fst::epsilon(),
        )
        .with_options(RewriteOptions::new(direction, mode))
        .compile(&sigma_star())
        .unwrap()
    }

    #[test]
    fn left_to_right_and_right_to_left_diverge() {
        let ltr = aa_to_b(Direction::LeftToRight, Mode::Obligatory);
        assert_eq!(outputs(&ltr, &[A, A, A]), vec![vec![B, A]]);
        let rtl = aa_to_b(Direction::RightToLeft, Mode::Obligatory);
        assert_eq!(outputs(&rtl, &[A, A, A]), vec![vec![A, B]]);
    }

    #[test]
    fn optional_adds_unrewritten_input() {
        let opt = aa_to_b(Direction::LeftToRight, Mode::Optional);
        let outs = outputs(&opt, &[A, A, A]);
        assert!(outs.contains(&vec![A, A, A]));
        assert!(outs.contains(&vec![B, A]));
        assert!(outs.contains(&vec![A, B]));
    }

    #[test]
    fn context_restricts_rewrite() {
        // a -> b / b __
        let rule = RewriteRule::new(
            Fst::from_labels(&[A]),
            Fst::from_labels(&[B]),
            Fst::from_labels(&[B]),
            Fst::epsilon(),
        )
        .compile(&sigma_star())
        .unwrap();
        assert_eq!(outputs(&rule, &[A, B, A]), vec![vec![A, B, B]]);
        // left-to-right: the rewritten b feeds the next context
        assert_eq!(outputs(&rule, &[B, A, A]), vec![vec![B, B, B]]);
    }

    #[test]
    fn simultaneous_context_sees_input_only() {
        let rule = RewriteRule::new(
            Fst::from_labels(&[A]),
            Fst::from_labels(&[B]),
            Fst::from_labels(&[B]),
            Fst::epsilon(),
        )
        .with_options(RewriteOptions::new(Direction::Simultaneous, Mode::Obligatory))
        .compile(&sigma_star())
        .unwrap();
        assert_eq!(outputs(&rule, &[B, A, A]), vec![vec![B, B, A]]);
    }

    #[test]
    fn strings_without_matches_pass_through() {
        let rule = aa_to_b(Direction::Simultaneous, Mode::Obligatory);
        assert_eq!(outputs(&rule, &[B, A, B]), vec![vec![B, A, B]]);
        assert_eq!(outputs(&rule, &[]), vec![Vec::<Label>::new()]);
    }

    #[test]
    fn weighted_phi_is_rejected() {
        let mut phi = Fst::from_labels(&[A]);
        phi.transitions_mut(StateId(0))[0].weight = TropicalWeight(1.0);
        let err = RewriteRule::new(phi, Fst::from_labels(&[B]), Fst::epsilon(), Fst::epsilon())
            .compile(&sigma_star())
            .unwrap_err();
        assert!(matches!(
            err,
            CompileError::NotUnweightedAcceptor {
                operand: Operand::Phi
            }
        ));
    }

    #[test]
    fn transducer_contexts_are_rejected() {
        let rule = RewriteRule::new(
            Fst::from_labels(&[A]),
            Fst::from_labels(&[B]),
            Fst::from_label_pairs(&[A], &[B]),
            Fst::epsilon(),
        );
        assert!(matches!(
            rule.compile(&sigma_star()),
            Err(CompileError::NotUnweightedAcceptor {
                operand: Operand::Lambda
            })
        ));
        let rule = RewriteRule::new(
            Fst::from_labels(&[A]),
            Fst::from_label_pairs(&[A], &[B]),
            Fst::epsilon(),
            Fst::epsilon(),
        );
        assert!(matches!(
            rule.compile(&sigma_star()),
            Err(CompileError::PsiNotAcceptor)
        ));
    }

    #[test]
    fn tau_form_derives_phi() {
        let rule = RewriteRule::from_tau(
            Fst::from_label_pairs(&[A, A], &[B]),
            Fst::epsilon(),
            Fst::epsilon(),
        )
        .unwrap();
        assert!(rule.phi_cross_psi);
        assert!(is_unweighted_acceptor(&rule.phi));
        let compiled = rule.compile(&sigma_star()).unwrap();
        assert_eq!(outputs(&compiled, &[A, A, A]), vec![vec![B, A]]);
    }

    #[test]
    fn tau_form_matches_phi_psi_form() {
        let tau = Fst::from_label_pairs(&[A], &[B]);
        let from_tau = RewriteRule::from_tau(tau, Fst::epsilon(), Fst::epsilon())
            .unwrap()
            .compile(&sigma_star())
            .unwrap();
        let from_pair = RewriteRule::new(
            Fst::from_labels(&[A]),
            Fst::from_labels(&[B]),
            Fst::epsilon(),
            Fst::epsilon(),
        )
        .compile(&sigma_star())
        .unwrap();
        for input in [&[A, B, A][..], &[B, B], &[A]] {
            assert_eq!(outputs(&from_tau, input), outputs(&from_pair, input));
        }
        assert_eq!(outputs(&from_tau, &[A, B, A]), vec![vec![B, B, B]]);
    }

    #[test]
    fn weights_of_psi_are_carried() {
        let mut psi = Fst::from_labels(&[B]);
        psi.set_final(StateId(1), TropicalWeight(2.5));
        let rule = RewriteRule::new(Fst::from_labels(&[A]), psi, Fst::epsilon(), Fst::epsilon())
            .compile(&sigma_star())
            .unwrap();
        let paths = string_pairs(&compose(&Fst::from_labels(&[A, A]), &rule)).unwrap();
        let total = paths
            .iter()
            .map(|p| p.2)
            .fold(TropicalWeight::zero(), |acc, w| acc.plus(&w));
        assert!(total.approx_eq(&TropicalWeight(5.0)));
    }

    #[test]
    fn compilation_is_repeatable() {
        let first = aa_to_b(Direction::RightToLeft, Mode::Optional);
        let second = aa_to_b(Direction::RightToLeft, Mode::Optional);
        assert_eq!(first.num_states(), second.num_states());
        for input in [&[A, A, A][..], &[A, B, A, A]] {
            assert_eq!(outputs(&first, input), outputs(&second, input));
        }
    }

    #[test]
    fn union_context() {
        // a -> b / (a | b) __ : only the initial a has no left context.
        let mut lambda = Fst::from_labels(&[A]);
        union(&mut lambda, &Fst::from_labels(&[B]));
        let rule = RewriteRule::new(
            Fst::from_labels(&[A]),
            Fst::from_labels(&[B]),
            lambda,
            Fst::epsilon(),
        )
        .with_options(RewriteOptions::new(Direction::Simultaneous, Mode::Obligatory))
        .compile(&sigma_star())
        .unwrap();
        assert_eq!(outputs(&rule, &[A, A, B, A]), vec![vec![A, B, B, B]]);
    }

    fn describe<W: Semiring>(rule: &RewriteRule<W>) -> String {
        format!("{:?}", rule.clone())
    }

    #[test]
    fn rules_are_debug_and_clone() {
        let rule = RewriteRule::new(
            Fst::from_labels(&[A]),
            Fst::from_labels(&[B]),
            Fst::epsilon(),
            Fst::epsilon(),
        );
        let text = describe(&rule);
        assert!(text.starts_with("RewriteRule"));
        assert!(text.contains("VectorFst"));
    }

    #[test]
    fn engine_errors_reach_the_caller() {
        // A negative epsilon cycle in psi has no shortest distance.
        let mut psi = Fst::from_labels(&[B]);
        psi.add_transition(
            StateId(0),
            Transition::new(EPSILON, EPSILON, TropicalWeight(-1.0), StateId(0)),
        );
        let err = RewriteRule::new(Fst::from_labels(&[A]), psi, Fst::epsilon(), Fst::epsilon())
            .compile(&sigma_star())
            .unwrap_err();
        assert!(matches!(err, CompileError::Fst(FstError::Diverged)));
    }
}
