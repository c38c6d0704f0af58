// -*- mode: rust; -*-
//
// This file is part of randhound.
// See LICENSE for licensing information.

//! Non-interactive Chaum-Pedersen proofs that two points share a
//! discrete logarithm relative to two bases, `log_G(xG) = log_H(xH)`.
//!
//! A single proof commits to `vG, vH` for a hedged nonce `v`, derives
//! `c` from a transcript over the statement and the commitments, and
//! answers with `r = v - c x`.  Verification recomputes
//! `vG = rG + c xG` and `vH = rH + c xH` and replays the transcript.
//!
//! Batches of proofs share one transcript over every base, every `xG`
//! and every commitment pair, so each proof is bound to the whole batch.
//! Every item draws its own nonce: a nonce shared by distinct secrets
//! would reveal their differences.  Each item's challenge additionally
//! binds that item's `xH`, which lets a verifier attribute a corrupted
//! `xH` to exactly the item it belongs to.
//!
//! Collective proofs instead answer one challenge derived from every
//! statement and commitment at once.  They are checked together: a
//! change to any statement changes the challenge and fails every item.

use alloc::vec;
use alloc::vec::Vec;

use merlin::Transcript;
use rand_core::{CryptoRng, RngCore};
use tracing::debug;

use crate::context::{ProofContext, ProofTranscript};
use crate::errors::{check_lengths, CryptoError, CryptoResult};
use crate::group::{GroupPoint, GroupScalar, Suite};

/// Outcome of checking a list of proofs, item by item.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchVerification {
    /// Indices whose proof verified
    pub good: Vec<usize>,
    /// Indices whose proof failed
    pub bad: Vec<usize>,
}

impl BatchVerification {
    /// Whether every proof verified.
    pub fn is_valid(&self) -> bool {
        self.bad.is_empty()
    }

    /// `Ok` with the good indices, or `ProofVerificationFailed` naming
    /// the bad ones.
    pub fn into_result(self) -> CryptoResult<Vec<usize>> {
        if self.bad.is_empty() {
            Ok(self.good)
        } else {
            Err(CryptoError::ProofVerificationFailed { indices: self.bad })
        }
    }

    fn record(&mut self, i: usize, ok: bool) {
        if ok { self.good.push(i) } else { self.bad.push(i) }
    }
}

/// A DLEQ proof: challenge `c`, response `r` and the commitments
/// `vG`, `vH`.
#[derive(Clone, Debug)]
pub struct DLEQProof<S: Suite> {
    /// Challenge
    pub c: S::Scalar,
    /// Response `v - c x`
    pub r: S::Scalar,
    /// Commitment `v G`
    pub vg: S::Point,
    /// Commitment `v H`
    pub vh: S::Point,
}

impl<S: Suite> PartialEq for DLEQProof<S> {
    fn eq(&self, other: &Self) -> bool {
        self.c == other.c && self.r == other.r && self.vg == other.vg && self.vh == other.vh
    }
}

impl<S: Suite> Eq for DLEQProof<S> {}

fn single_statement<S: Suite>(ctx: &ProofContext, g: &S::Point, h: &S::Point, xg: &S::Point, xh: &S::Point) -> Transcript {
    let mut t = ctx.transcript();
    t.proto_name(b"dleq");
    t.commit_point(b"G", g);
    t.commit_point(b"H", h);
    t.commit_point(b"xG", xg);
    t.commit_point(b"xH", xh);
    t
}

fn batch_transcript<S: Suite>(ctx: &ProofContext, g: &[S::Point], h: &[S::Point], xg: &[S::Point], vg: &[&S::Point], vh: &[&S::Point]) -> Transcript {
    let mut t = ctx.transcript();
    t.proto_name(b"dleq-batch");
    t.commit_index(b"n", g.len());
    for i in 0..g.len() {
        t.commit_point(b"G", &g[i]);
        t.commit_point(b"H", &h[i]);
        t.commit_point(b"xG", &xg[i]);
        t.commit_point(b"vG", vg[i]);
        t.commit_point(b"vH", vh[i]);
    }
    t
}

fn collective_transcript<S: Suite>(
    ctx: &ProofContext,
    g: &[S::Point],
    h: &[S::Point],
    xg: &[S::Point],
    xh: &[S::Point],
    vg: &[&S::Point],
    vh: &[&S::Point],
) -> Transcript {
    let mut t = ctx.transcript();
    t.proto_name(b"dleq-collective");
    t.commit_index(b"n", g.len());
    for i in 0..g.len() {
        t.commit_point(b"G", &g[i]);
        t.commit_point(b"H", &h[i]);
        t.commit_point(b"xG", &xg[i]);
        t.commit_point(b"xH", &xh[i]);
        t.commit_point(b"vG", vg[i]);
        t.commit_point(b"vH", vh[i]);
    }
    t
}

/// Per item hedged nonces and their commitments `vG_i`, `vH_i`.
#[allow(clippy::type_complexity)]
fn item_commitments<S, R>(
    ctx: &ProofContext,
    suite: &S,
    g: &[S::Point],
    h: &[S::Point],
    xg: &[S::Point],
    xh: &[S::Point],
    x: &[S::Scalar],
    rng: &mut R,
) -> (Vec<S::Scalar>, Vec<S::Point>, Vec<S::Point>)
where
    S: Suite,
    R: RngCore + CryptoRng,
{
    let n = g.len();
    let mut v = Vec::with_capacity(n);
    let mut vg = Vec::with_capacity(n);
    let mut vh = Vec::with_capacity(n);
    for i in 0..n {
        let mut w = single_statement::<S>(ctx, &g[i], &h[i], &xg[i], &xh[i]);
        w.commit_index(b"i", i);
        let vi = w.witness_scalar(suite, b"x", &x[i], rng);
        vg.push(g[i].clone() * &vi);
        vh.push(h[i].clone() * &vi);
        v.push(vi);
    }
    (v, vg, vh)
}

fn item_challenge<S: Suite>(suite: &S, batch: &Transcript, i: usize, xh: &S::Point) -> S::Scalar {
    let mut t = batch.clone();
    t.commit_index(b"i", i);
    t.commit_point(b"xH", xh);
    t.challenge_scalar(suite, b"c")
}

/// Whether `rG + c xG = vG` and `rH + c xH = vH`.
fn equations_hold<S: Suite>(proof: &DLEQProof<S>, g: &S::Point, h: &S::Point, xg: &S::Point, xh: &S::Point) -> bool {
    let a = g.clone() * &proof.r + &(xg.clone() * &proof.c);
    let b = h.clone() * &proof.r + &(xh.clone() * &proof.c);
    a == proof.vg && b == proof.vh
}

impl<S: Suite> DLEQProof<S> {
    /// Prove `log_G(xG) = log_H(xH)` for the secret `x`, returning the
    /// proof together with `xG` and `xH`.
    pub fn new<R>(ctx: &ProofContext, suite: &S, g: &S::Point, h: &S::Point, x: &S::Scalar, rng: &mut R) -> (DLEQProof<S>, S::Point, S::Point)
    where
        R: RngCore + CryptoRng,
    {
        let xg = g.clone() * x;
        let xh = h.clone() * x;
        let mut t = single_statement::<S>(ctx, g, h, &xg, &xh);

        let v = t.witness_scalar(suite, b"x", x, rng);
        let vg = g.clone() * &v;
        let vh = h.clone() * &v;
        t.commit_point(b"vG", &vg);
        t.commit_point(b"vH", &vh);

        let c = t.challenge_scalar(suite, b"c");
        let r = v - &(c.clone() * x);
        (DLEQProof { c, r, vg, vh }, xg, xh)
    }

    /// Prove `log_{G_i}(x_i G_i) = log_{H_i}(x_i H_i)` for every `i` in one
    /// batch.  Fails with `LengthMismatch` before any work if the inputs
    /// disagree in length.
    #[allow(clippy::type_complexity)]
    pub fn new_batch<R>(
        ctx: &ProofContext,
        suite: &S,
        g: &[S::Point],
        h: &[S::Point],
        x: &[S::Scalar],
        rng: &mut R,
    ) -> CryptoResult<(Vec<DLEQProof<S>>, Vec<S::Point>, Vec<S::Point>)>
    where
        R: RngCore + CryptoRng,
    {
        check_lengths(&[g.len(), h.len(), x.len()])?;
        let n = g.len();

        let xg: Vec<S::Point> = g.iter().zip(x).map(|(g, x)| g.clone() * x).collect();
        let xh: Vec<S::Point> = h.iter().zip(x).map(|(h, x)| h.clone() * x).collect();
        let (v, vg, vh) = item_commitments(ctx, suite, g, h, &xg, &xh, x, rng);

        let vg_refs: Vec<&S::Point> = vg.iter().collect();
        let vh_refs: Vec<&S::Point> = vh.iter().collect();
        let batch = batch_transcript::<S>(ctx, g, h, &xg, &vg_refs, &vh_refs);

        let proofs = v.into_iter()
            .zip(vg.into_iter().zip(vh))
            .enumerate()
            .map(|(i, (v, (vg, vh)))| {
                let c = item_challenge(suite, &batch, i, &xh[i]);
                let r = v - &(c.clone() * &x[i]);
                DLEQProof { c, r, vg, vh }
            })
            .collect();
        debug!(n, "dleq batch proven");
        Ok((proofs, xg, xh))
    }

    /// Prove `log_{G_i}(x_i G_i) = log_{H_i}(x_i H_i)` for every `i` under
    /// one collective challenge `c`, so `r_i = v_i - c x_i`.  Fails with
    /// `LengthMismatch` before any work if the inputs disagree in length.
    #[allow(clippy::type_complexity)]
    pub fn new_collective<R>(
        ctx: &ProofContext,
        suite: &S,
        g: &[S::Point],
        h: &[S::Point],
        x: &[S::Scalar],
        rng: &mut R,
    ) -> CryptoResult<(Vec<DLEQProof<S>>, Vec<S::Point>, Vec<S::Point>)>
    where
        R: RngCore + CryptoRng,
    {
        check_lengths(&[g.len(), h.len(), x.len()])?;
        let n = g.len();

        let xg: Vec<S::Point> = g.iter().zip(x).map(|(g, x)| g.clone() * x).collect();
        let xh: Vec<S::Point> = h.iter().zip(x).map(|(h, x)| h.clone() * x).collect();
        let (v, vg, vh) = item_commitments(ctx, suite, g, h, &xg, &xh, x, rng);

        let vg_refs: Vec<&S::Point> = vg.iter().collect();
        let vh_refs: Vec<&S::Point> = vh.iter().collect();
        let c = collective_transcript::<S>(ctx, g, h, &xg, &xh, &vg_refs, &vh_refs).challenge_scalar(suite, b"c");

        let proofs = v.into_iter()
            .zip(vg.into_iter().zip(vh))
            .zip(x)
            .map(|((v, (vg, vh)), x)| {
                let r = v - &(c.clone() * x);
                DLEQProof { c: c.clone(), r, vg, vh }
            })
            .collect();
        debug!(n, "dleq collective proven");
        Ok((proofs, xg, xh))
    }

    /// Verify a proof created by `DLEQProof::new`.
    pub fn verify(&self, ctx: &ProofContext, suite: &S, g: &S::Point, h: &S::Point, xg: &S::Point, xh: &S::Point) -> CryptoResult<()> {
        let mut t = single_statement::<S>(ctx, g, h, xg, xh);
        t.commit_point(b"vG", &self.vg);
        t.commit_point(b"vH", &self.vh);
        let c = t.challenge_scalar(suite, b"c");
        if c == self.c && equations_hold(self, g, h, xg, xh) {
            Ok(())
        } else {
            Err(CryptoError::ProofVerificationFailed { indices: vec![0] })
        }
    }

    /// Verify proofs created together by `DLEQProof::new_batch`, reporting
    /// every index whose proof fails rather than stopping at the first.
    pub fn verify_batch(
        ctx: &ProofContext,
        suite: &S,
        g: &[S::Point],
        h: &[S::Point],
        xg: &[S::Point],
        xh: &[S::Point],
        proofs: &[DLEQProof<S>],
    ) -> CryptoResult<BatchVerification> {
        check_lengths(&[g.len(), h.len(), xg.len(), xh.len(), proofs.len()])?;
        let vg: Vec<&S::Point> = proofs.iter().map(|p| &p.vg).collect();
        let vh: Vec<&S::Point> = proofs.iter().map(|p| &p.vh).collect();
        let batch = batch_transcript::<S>(ctx, g, h, xg, &vg, &vh);

        let mut result = BatchVerification::default();
        for (i, proof) in proofs.iter().enumerate() {
            let c = item_challenge(suite, &batch, i, &xh[i]);
            result.record(i, c == proof.c && equations_hold(proof, &g[i], &h[i], &xg[i], &xh[i]));
        }
        debug!(n = proofs.len(), bad = result.bad.len(), "dleq batch verified");
        Ok(result)
    }

    /// Verify proofs created together by `DLEQProof::new_collective`.
    ///
    /// Each item must carry the recomputed collective challenge and satisfy
    /// its own equations.  A changed statement changes that challenge, so
    /// every index is then reported bad.
    pub fn verify_collective(
        ctx: &ProofContext,
        suite: &S,
        g: &[S::Point],
        h: &[S::Point],
        xg: &[S::Point],
        xh: &[S::Point],
        proofs: &[DLEQProof<S>],
    ) -> CryptoResult<BatchVerification> {
        check_lengths(&[g.len(), h.len(), xg.len(), xh.len(), proofs.len()])?;
        let vg: Vec<&S::Point> = proofs.iter().map(|p| &p.vg).collect();
        let vh: Vec<&S::Point> = proofs.iter().map(|p| &p.vh).collect();
        let c = collective_transcript::<S>(ctx, g, h, xg, xh, &vg, &vh).challenge_scalar(suite, b"c");

        let mut result = BatchVerification::default();
        for (i, proof) in proofs.iter().enumerate() {
            result.record(i, proof.c == c && equations_hold(proof, &g[i], &h[i], &xg[i], &xh[i]));
        }
        debug!(n = proofs.len(), bad = result.bad.len(), "dleq collective verified");
        Ok(result)
    }

    /// Verify independently created single proofs, item by item.
    pub fn verify_each(
        ctx: &ProofContext,
        suite: &S,
        g: &[S::Point],
        h: &[S::Point],
        xg: &[S::Point],
        xh: &[S::Point],
        proofs: &[DLEQProof<S>],
    ) -> CryptoResult<BatchVerification> {
        check_lengths(&[g.len(), h.len(), xg.len(), xh.len(), proofs.len()])?;
        let mut result = BatchVerification::default();
        for (i, proof) in proofs.iter().enumerate() {
            result.record(i, proof.verify(ctx, suite, &g[i], &h[i], &xg[i], &xh[i]).is_ok());
        }
        debug!(n = proofs.len(), bad = result.bad.len(), "dleq proofs verified");
        Ok(result)
    }

    /// Encoded length: two scalars and two points.
    pub fn byte_len(suite: &S) -> usize {
        2 * suite.scalar_len() + 2 * suite.point_len()
    }

    /// Encode as `c || r || vG || vH`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.c.to_bytes();
        bytes.extend_from_slice(&self.r.to_bytes());
        bytes.extend_from_slice(&self.vg.to_bytes());
        bytes.extend_from_slice(&self.vh.to_bytes());
        bytes
    }

    /// Decode `c || r || vG || vH`, checking each component.
    pub fn from_bytes(suite: &S, bytes: &[u8]) -> CryptoResult<DLEQProof<S>> {
        if bytes.len() != Self::byte_len(suite) {
            return Err(CryptoError::MalformedEncoding { name: "DLEQProof", length: Self::byte_len(suite) });
        }
        let (c, rest) = bytes.split_at(suite.scalar_len());
        let (r, rest) = rest.split_at(suite.scalar_len());
        let (vg, vh) = rest.split_at(suite.point_len());
        Ok(DLEQProof {
            c: suite.scalar_from_bytes(c)?,
            r: suite.scalar_from_bytes(r)?,
            vg: suite.point_from_bytes(vg)?,
            vh: suite.point_from_bytes(vh)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::proof_context;
    use crate::edwards::{EdwardsPoint, EdwardsSuite, Scalar};
    use alloc::format;
    use rand::thread_rng;

    fn bases(suite: &EdwardsSuite, n: usize) -> (Vec<EdwardsPoint>, Vec<EdwardsPoint>, Vec<Scalar>) {
        let mut rng = thread_rng();
        let mut g = Vec::new();
        let mut h = Vec::new();
        let mut x = Vec::new();
        for i in 0..n {
            let gi = format!("G{}", i);
            let hi = format!("H{}", i);
            g.push(suite.pick_point(Some(gi.as_bytes()), &mut rng).unwrap().0);
            h.push(suite.pick_point(Some(hi.as_bytes()), &mut rng).unwrap().0);
            x.push(suite.random_scalar(&mut rng));
        }
        (g, h, x)
    }

    #[test]
    fn single_proofs_verify() {
        let suite = EdwardsSuite::ed25519();
        let ctx = proof_context(b"dleq test");
        let (g, h, x) = bases(&suite, 3);
        for i in 0..3 {
            let (proof, xg, xh) = DLEQProof::new(&ctx, &suite, &g[i], &h[i], &x[i], &mut thread_rng());
            assert_eq!(xg, g[i].clone() * &x[i]);
            proof.verify(&ctx, &suite, &g[i], &h[i], &xg, &xh).unwrap();
        }
    }

    #[test]
    fn perturbed_statement_fails() {
        let suite = EdwardsSuite::ed25519();
        let ctx = proof_context(b"dleq test");
        let (g, h, x) = bases(&suite, 1);
        let (proof, xg, xh) = DLEQProof::new(&ctx, &suite, &g[0], &h[0], &x[0], &mut thread_rng());
        let wrong = xh.clone() + &suite.base();
        assert_eq!(
            proof.verify(&ctx, &suite, &g[0], &h[0], &xg, &wrong),
            Err(CryptoError::ProofVerificationFailed { indices: vec![0] })
        );
        // A proof only holds in the context it was made for.
        assert!(proof.verify(&proof_context(b"elsewhere"), &suite, &g[0], &h[0], &xg, &xh).is_err());
    }

    #[test]
    fn batches_verify_and_localize_failures() {
        let suite = EdwardsSuite::ed25519();
        let ctx = proof_context(b"dleq test");
        let (g, h, x) = bases(&suite, 5);
        let (proofs, xg, mut xh) = DLEQProof::new_batch(&ctx, &suite, &g, &h, &x, &mut thread_rng()).unwrap();

        let v = DLEQProof::verify_batch(&ctx, &suite, &g, &h, &xg, &xh, &proofs).unwrap();
        assert_eq!(v.good, vec![0, 1, 2, 3, 4]);
        assert!(v.is_valid());

        xh[3] = xh[3].clone() + &suite.base();
        let v = DLEQProof::verify_batch(&ctx, &suite, &g, &h, &xg, &xh, &proofs).unwrap();
        assert_eq!(v.bad, vec![3]);
        assert_eq!(v.good, vec![0, 1, 2, 4]);
        assert_eq!(v.into_result(), Err(CryptoError::ProofVerificationFailed { indices: vec![3] }));
    }

    #[test]
    fn batch_nonces_are_independent() {
        let suite = EdwardsSuite::ed25519();
        let ctx = proof_context(b"dleq test");
        let (g, h, x) = bases(&suite, 2);
        let (proofs, _, _) = DLEQProof::new_batch(&ctx, &suite, &g, &h, &x, &mut thread_rng()).unwrap();
        // With a shared nonce, r_0 + c_0 x_0 and r_1 + c_1 x_1 would agree.
        let v0 = proofs[0].r.clone() + &(proofs[0].c.clone() * &x[0]);
        let v1 = proofs[1].r.clone() + &(proofs[1].c.clone() * &x[1]);
        assert_ne!(v0, v1);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let suite = EdwardsSuite::ed25519();
        let ctx = proof_context(b"dleq test");
        let (g, h, mut x) = bases(&suite, 4);
        x.remove(2);
        assert_eq!(
            DLEQProof::new_batch(&ctx, &suite, &g, &h, &x, &mut thread_rng()).err(),
            Some(CryptoError::LengthMismatch { expected: 4, actual: 3 })
        );
        assert_eq!(
            DLEQProof::verify_batch(&ctx, &suite, &g, &h, &g, &h[..3], &[]).err(),
            Some(CryptoError::LengthMismatch { expected: 4, actual: 3 })
        );
    }

    #[test]
    fn proofs_round_trip_through_bytes() {
        let suite = EdwardsSuite::ed25519();
        let ctx = proof_context(b"dleq test");
        let (g, h, x) = bases(&suite, 1);
        let (proof, _, _) = DLEQProof::new(&ctx, &suite, &g[0], &h[0], &x[0], &mut thread_rng());
        let bytes = proof.to_bytes();
        assert_eq!(bytes.len(), 128);
        assert_eq!(DLEQProof::from_bytes(&suite, &bytes).unwrap(), proof);
        assert_eq!(
            DLEQProof::<EdwardsSuite>::from_bytes(&suite, &bytes[1..]).err(),
            Some(CryptoError::MalformedEncoding { name: "DLEQProof", length: 128 })
        );
    }

    #[test]
    fn independent_proofs_verify_item_by_item() {
        let suite = EdwardsSuite::ed25519();
        let ctx = proof_context(b"dleq test");
        let (g, h, x) = bases(&suite, 3);
        let mut proofs = Vec::new();
        let mut xg = Vec::new();
        let mut xh = Vec::new();
        for i in 0..3 {
            let (p, a, b) = DLEQProof::new(&ctx, &suite, &g[i], &h[i], &x[i], &mut thread_rng());
            proofs.push(p);
            xg.push(a);
            xh.push(b);
        }
        proofs.swap(0, 1);
        let v = DLEQProof::verify_each(&ctx, &suite, &g, &h, &xg, &xh, &proofs).unwrap();
        assert_eq!(v.bad, vec![0, 1]);
        assert_eq!(v.good, vec![2]);
    }

    #[test]
    fn collective_proofs_verify() {
        let suite = EdwardsSuite::ed25519();
        let ctx = proof_context(b"dleq test");
        let mut rng = thread_rng();
        let g1 = suite.pick_point(Some(&b"G1"[..]), &mut rng).unwrap().0;
        let h1 = suite.pick_point(Some(&b"H1"[..]), &mut rng).unwrap().0;
        let x = suite.random_scalar(&mut rng);
        let g2 = suite.pick_point(Some(&b"G2"[..]), &mut rng).unwrap().0;
        let h2 = suite.pick_point(Some(&b"H2"[..]), &mut rng).unwrap().0;
        let y = suite.random_scalar(&mut rng);

        let g = vec![g1, g2];
        let h = vec![h1, h2];
        let (proofs, xg, xh) = DLEQProof::new_collective(&ctx, &suite, &g, &h, &[x.clone(), y], &mut rng).unwrap();
        assert_eq!(proofs[0].c, proofs[1].c);
        assert_eq!(xh[0], h[0].clone() * &x);

        let v = DLEQProof::verify_collective(&ctx, &suite, &g, &h, &xg, &xh, &proofs).unwrap();
        assert!(v.is_valid());
        assert_eq!(v.good, vec![0, 1]);
    }

    #[test]
    fn collective_proofs_stand_or_fall_together() {
        let suite = EdwardsSuite::ed25519();
        let ctx = proof_context(b"dleq test");
        let (g, h, x) = bases(&suite, 3);
        let (proofs, xg, mut xh) = DLEQProof::new_collective(&ctx, &suite, &g, &h, &x, &mut thread_rng()).unwrap();

        // Collective and batched proofs are not interchangeable.
        let v = DLEQProof::verify_batch(&ctx, &suite, &g, &h, &xg, &xh, &proofs).unwrap();
        assert_eq!(v.bad, vec![0, 1, 2]);

        xh[1] = xh[1].clone() + &suite.base();
        let v = DLEQProof::verify_collective(&ctx, &suite, &g, &h, &xg, &xh, &proofs).unwrap();
        assert_eq!(v.bad, vec![0, 1, 2]);
        assert!(v.good.is_empty());

        let mut short = x.clone();
        short.pop();
        assert_eq!(
            DLEQProof::new_collective(&ctx, &suite, &g, &h, &short, &mut thread_rng()).err(),
            Some(CryptoError::LengthMismatch { expected: 3, actual: 2 })
        );
    }
}
