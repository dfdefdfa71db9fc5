use std::collections::BTreeMap;

use proptest::collection::vec;
use proptest::num::u64;
use proptest::proptest;

use kmersketch::encodings::Molecule;
use kmersketch::signature::Sketchable;
use kmersketch::sketch::minhash::{max_hash_for_scaled, MinHash};
use kmersketch::Error;

const EPSILON: f64 = 0.01;

#[test]
fn throws_error() {
    let mut mh = MinHash::new(0, 4, Molecule::Dna, 42, false, 1);

    assert!(
        mh.add_sequence(b"ATGR", false).is_err(),
        "R is not a valid DNA character"
    );
}

#[test]
fn merge() {
    let mut a = MinHash::new(0, 10, Molecule::Dna, 42, false, 20);
    let mut b = MinHash::new(0, 10, Molecule::Dna, 42, false, 20);

    a.add_sequence(b"TGCCGCCCAGCA", false).unwrap();
    b.add_sequence(b"TGCCGCCCAGCA", false).unwrap();

    a.add_sequence(b"GTCCGCCCAGTGA", false).unwrap();
    b.add_sequence(b"GTCCGCCCAGTGG", false).unwrap();

    a.merge(&b).unwrap();
    assert_eq!(
        a.to_vec(),
        vec![
            2996412506971915891,
            4448613756639084635,
            8373222269469409550,
            9390240264282449587,
            11085758717695534616,
            11668188995231815419,
            11760449009842383350,
            14682565545778736889,
        ]
    );
}

#[test]
fn invalid_dna() {
    let mut a = MinHash::new(0, 3, Molecule::Dna, 42, false, 20);

    a.add_sequence(b"AAANNCCCTN", true).unwrap();
    assert_eq!(a.mins().len(), 3);

    let mut b = MinHash::new(0, 3, Molecule::Dna, 42, false, 20);
    b.add_sequence(b"NAAA", true).unwrap();
    assert_eq!(b.mins().len(), 1);
}

#[test]
fn bottom_num_sampling() {
    // canonical folding collapses repeated palindromic content
    let mut mh = MinHash::new(0, 3, Molecule::Dna, 42, false, 5);
    mh.add_sequence(b"ATGCATGCAT", false).unwrap();
    assert_eq!(mh.size(), 2);

    // a sequence with nine distinct canonical 3-mers keeps the 5
    // smallest hashes, in ascending order
    let mut mh = MinHash::new(0, 3, Molecule::Dna, 42, false, 5);
    mh.add_sequence(b"AATCGGCTAAGC", false).unwrap();

    let mins = mh.mins();
    assert_eq!(mins.len(), 5);
    assert!(mins.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn canonical_dna_is_strand_symmetric() {
    let seq = b"TGCCGCCCAGCACCGGGTGACTAGGTTGAGCCATGATTAACCTGCAATGA";
    let rc: Vec<u8> = seq
        .iter()
        .rev()
        .map(|c| match c {
            b'A' => b'T',
            b'T' => b'A',
            b'C' => b'G',
            b'G' => b'C',
            _ => unreachable!(),
        })
        .collect();

    let mut fwd = MinHash::new(0, 21, Molecule::Dna, 42, false, 100);
    let mut rev = MinHash::new(0, 21, Molecule::Dna, 42, false, 100);

    fwd.add_sequence(seq, false).unwrap();
    rev.add_sequence(&rc, false).unwrap();

    assert_eq!(fwd.mins(), rev.mins());
}

#[test]
fn weighted_merge() {
    let mut a = MinHash::new(0, 21, Molecule::Dna, 42, true, 10);
    let mut b = MinHash::new(0, 21, Molecule::Dna, 42, true, 10);

    a.add_hash_with_abundance(7, 2);
    a.add_hash_with_abundance(9, 1);
    b.add_hash_with_abundance(7, 3);
    b.add_hash_with_abundance(11, 5);

    a.merge(&b).unwrap();

    assert_eq!(a.mins(), vec![7, 9, 11]);
    assert_eq!(a.abunds(), Some(vec![5, 1, 5]));
}

#[test]
fn jaccard_small() {
    let mut a = MinHash::new(0, 21, Molecule::Dna, 42, false, 5);
    let mut b = MinHash::new(0, 21, Molecule::Dna, 42, false, 5);

    a.add_many(&[1, 2, 3]).unwrap();
    b.add_many(&[2, 3, 4]).unwrap();

    assert!((a.jaccard(&b).unwrap() - 0.5).abs() < f64::EPSILON);
}

#[test]
fn angular_small() {
    let mut a = MinHash::new(0, 21, Molecule::Dna, 42, true, 5);
    let mut b = MinHash::new(0, 21, Molecule::Dna, 42, true, 5);

    a.set_abundances(&[(1, 1), (2, 2), (3, 3)], false).unwrap();
    b.set_abundances(&[(2, 2), (3, 3), (4, 4)], false).unwrap();

    let cos = 13. / (14f64.sqrt() * 29f64.sqrt());
    let expected = 1. - 2. * cos.acos() / std::f64::consts::PI;

    let angular = a.angular_similarity(&b).unwrap();
    assert!((angular - expected).abs() < 1e-12, "{}", angular);
}

#[test]
fn similarity() -> Result<(), Box<dyn std::error::Error>> {
    let mut a = MinHash::new(0, 20, Molecule::Hp, 42, true, 5);
    let mut b = MinHash::new(0, 20, Molecule::Hp, 42, true, 5);

    a.add_hash(1);
    b.add_hash(1);
    b.add_hash(2);

    assert!((a.similarity(&a, false, false)? - 1.0).abs() < EPSILON);
    assert!((a.similarity(&b, false, false)? - 0.5).abs() < EPSILON);

    Ok(())
}

#[test]
fn similarity_with_sequences() -> Result<(), Box<dyn std::error::Error>> {
    let mut a = MinHash::new(0, 5, Molecule::Dna, 42, true, 5);
    let mut b = MinHash::new(0, 5, Molecule::Dna, 42, true, 5);

    a.add_sequence(b"ATGGA", false)?;
    a.add_sequence(b"GGACA", false)?;

    a.add_sequence(b"ATGGA", false)?;
    b.add_sequence(b"ATGGA", false)?;

    assert!(
        (a.similarity(&b, false, false)? - 0.705).abs() < EPSILON,
        "{}",
        a.similarity(&b, false, false)?
    );

    Ok(())
}

#[test]
fn similarity_ignore_abundance() -> Result<(), Box<dyn std::error::Error>> {
    let mut a = MinHash::new(0, 20, Molecule::Dayhoff, 42, true, 5);
    let mut b = MinHash::new(0, 20, Molecule::Dayhoff, 42, true, 5);

    a.add_hash(1);
    a.add_hash(1);
    a.add_hash(5);
    a.add_hash(5);

    b.add_hash(1);
    b.add_hash(2);
    b.add_hash(3);
    b.add_hash(4);

    assert!((a.similarity(&a, false, false)? - 1.0).abs() < EPSILON);
    assert!((a.similarity(&b, false, false)? - 0.23).abs() < EPSILON);

    assert!((a.similarity(&a, true, false)? - 1.0).abs() < EPSILON);
    assert!((a.similarity(&b, true, false)? - 0.2).abs() < EPSILON);

    Ok(())
}

#[test]
fn similarity_empty_is_zero() -> Result<(), Box<dyn std::error::Error>> {
    let a = MinHash::new(0, 21, Molecule::Dna, 42, true, 5);
    let mut b = MinHash::new(0, 21, Molecule::Dna, 42, true, 5);

    b.add_hash_with_abundance(1, 3);

    assert_eq!(a.similarity(&b, false, false)?, 0.0);
    assert_eq!(b.similarity(&a, false, false)?, 0.0);

    Ok(())
}

#[test]
fn dayhoff() {
    let mut a = MinHash::new(0, 6, Molecule::Dayhoff, 42, false, 10);
    let mut b = MinHash::new(0, 6, Molecule::Protein, 42, false, 10);

    a.add_sequence(b"ACTGAC", false).unwrap();
    b.add_sequence(b"ACTGAC", false).unwrap();

    assert_eq!(a.size(), 2);
    assert_eq!(b.size(), 2);
}

#[test]
fn hp() {
    let mut a = MinHash::new(0, 6, Molecule::Hp, 42, false, 10);
    let mut b = MinHash::new(0, 6, Molecule::Protein, 42, false, 10);

    a.add_sequence(b"ACTGAC", false).unwrap();
    b.add_sequence(b"ACTGAC", false).unwrap();

    assert_eq!(a.size(), 2);
    assert_eq!(b.size(), 2);
}

#[test]
fn protein_six_frames() {
    // nine nucleotides hash as amino acid 3-mers across all six frames,
    // and the sketch is identical for the reverse complement input
    let seq = b"ATGGCCATTGTAATGGGCCGCTGAAAGGGTGCCCGATAG";
    let rc: Vec<u8> = seq
        .iter()
        .rev()
        .map(|c| match c {
            b'A' => b'T',
            b'T' => b'A',
            b'C' => b'G',
            b'G' => b'C',
            _ => unreachable!(),
        })
        .collect();

    let mut fwd = MinHash::new(0, 9, Molecule::Protein, 42, false, 100);
    let mut rev = MinHash::new(0, 9, Molecule::Protein, 42, false, 100);

    fwd.add_sequence(seq, false).unwrap();
    rev.add_sequence(&rc, false).unwrap();

    assert!(fwd.size() > 0);
    assert_eq!(fwd.mins(), rev.mins());
}

#[test]
fn add_protein_direct() {
    let mut mh = MinHash::new(0, 9, Molecule::Protein, 42, false, 10);
    mh.add_protein(b"MVSSACTGAC").unwrap();

    // residue windows of ksize / 3
    assert_eq!(mh.size(), 8);
}

#[test]
fn max_for_scaled() {
    assert_eq!(max_hash_for_scaled(100), 184467440737095520);
}

#[test]
fn set_abundances_exact() {
    let mut mh = MinHash::new(0, 21, Molecule::Dna, 42, true, 10);

    mh.add_hash_with_abundance(5, 7);
    mh.set_abundances(&[(5, 2), (9, 4)], false).unwrap();

    assert_eq!(mh.mins(), vec![5, 9]);
    assert_eq!(mh.abunds(), Some(vec![2, 4]));

    mh.set_abundances(&[(11, 1)], true).unwrap();
    assert_eq!(mh.mins(), vec![11]);
    assert_eq!(mh.abunds(), Some(vec![1]));

    // abundance zero removes
    mh.set_abundances(&[(11, 0)], false).unwrap();
    assert!(mh.is_empty());
}

#[test]
fn compatibility_checks() {
    let base = MinHash::new(0, 21, Molecule::Dna, 42, false, 500);

    let other = MinHash::new(0, 31, Molecule::Dna, 42, false, 500);
    assert!(matches!(
        base.check_compatible(&other),
        Err(Error::MismatchKSizes)
    ));

    let other = MinHash::new(0, 21, Molecule::Protein, 42, false, 500);
    assert!(matches!(
        base.check_compatible(&other),
        Err(Error::MismatchDNAProt)
    ));

    let other = MinHash::new(1000, 21, Molecule::Dna, 42, false, 500);
    assert!(matches!(
        base.check_compatible(&other),
        Err(Error::MismatchScaled)
    ));

    let other = MinHash::new(0, 21, Molecule::Dna, 43, false, 500);
    assert!(matches!(
        base.check_compatible(&other),
        Err(Error::MismatchSeed)
    ));

    let other = MinHash::new(0, 21, Molecule::Dna, 42, false, 100);
    assert!(matches!(
        base.check_compatible(&other),
        Err(Error::MismatchNum { .. })
    ));
}

#[test]
fn merge_never_mutates_on_error() {
    let mut a = MinHash::new(0, 21, Molecule::Dna, 42, false, 5);
    let b = MinHash::new(0, 31, Molecule::Dna, 42, false, 5);

    a.add_many(&[1, 2, 3]).unwrap();
    assert!(a.merge(&b).is_err());
    assert_eq!(a.mins(), vec![1, 2, 3]);
}

#[test]
fn downsample_num_smallest() {
    let mut mh = MinHash::new(0, 21, Molecule::Dna, 42, true, 10);
    mh.add_many_with_abund(&[(10, 1), (20, 2), (30, 3), (40, 4)])
        .unwrap();

    let smaller = mh.downsample_num(2).unwrap();
    assert_eq!(smaller.num(), 2);
    assert_eq!(smaller.mins(), vec![10, 20]);
    assert_eq!(smaller.abunds(), Some(vec![1, 2]));

    // growing the cap back is not allowed
    assert!(matches!(
        smaller.downsample_num(5),
        Err(Error::MismatchNum { .. })
    ));
}

#[test]
fn downsample_max_hash_requires_coarsening() {
    let mh = MinHash::new(1000, 21, Molecule::Dna, 42, false, 0);
    let coarser = max_hash_for_scaled(2000);
    let finer = max_hash_for_scaled(500);

    assert!(mh.downsample_max_hash(coarser).is_ok());
    assert!(matches!(
        mh.downsample_max_hash(finer),
        Err(Error::MismatchScaled)
    ));
}

#[test]
fn downsample_then_compare() -> Result<(), Box<dyn std::error::Error>> {
    let mut a = MinHash::new(2000, 21, Molecule::Dna, 42, false, 0);
    let mut b = MinHash::new(1000, 21, Molecule::Dna, 42, false, 0);

    for i in 0u64..3000 {
        let hash = kmersketch::hash_murmur(&i.to_le_bytes(), 42);
        a.add_hash(hash);
        b.add_hash(hash);
    }
    for i in 3000u64..4000 {
        let hash = kmersketch::hash_murmur(&i.to_le_bytes(), 42);
        b.add_hash(hash);
    }

    // implicit downsampling must agree with explicit downsampling
    let implicit = a.similarity(&b, true, true)?;
    let explicit = a.similarity(&b.downsample_max_hash(a.max_hash())?, true, false)?;
    assert!((implicit - explicit).abs() < 1e-12);

    let implicit = a.count_common(&b, true)?;
    let explicit = a.count_common(&b.downsample_max_hash(a.max_hash())?, false)?;
    assert_eq!(implicit, explicit);

    // without downsampling the comparison is rejected
    assert!(a.similarity(&b, true, false).is_err());

    Ok(())
}

proptest! {
#[test]
fn scaled_sampling_rate(seq in "[ACGT]{10000}") {
    let mut mh = MinHash::new(1000, 21, Molecule::Dna, 42, false, 0);
    mh.add_sequence(seq.as_bytes(), false).unwrap();

    let max_hash = max_hash_for_scaled(1000);
    assert!(mh.mins().iter().all(|&h| h <= max_hash));
    // |mins| is around 10000 / 1000, with generous slack
    assert!(mh.size() < 60, "{}", mh.size());
}
}

proptest! {
#[test]
fn oracle_mins(hashes in vec(u64::ANY, 1..2000)) {
    // the sketch must match a from-scratch model: the distinct accepted
    // hashes in ascending order, truncated to the num smallest, with
    // abundances counting every insertion of a surviving hash
    let mut mh = MinHash::new(0, 21, Molecule::Dna, 42, true, 500);
    let mut model: BTreeMap<u64, u64> = BTreeMap::new();

    for hash in &hashes {
        mh.add_hash(*hash);
        *model.entry(*hash).or_insert(0) += 1;
    }

    let expected_mins: Vec<u64> = model.keys().cloned().take(500).collect();
    let expected_abunds: Vec<u64> = model.values().cloned().take(500).collect();

    assert_eq!(mh.mins(), expected_mins);
    assert_eq!(mh.abunds(), Some(expected_abunds));
}
}

proptest! {
#[test]
fn oracle_mins_scaled(hashes in vec(u64::ANY, 1..2000)) {
    let scaled = 3;
    let max_hash = max_hash_for_scaled(scaled);
    let mut mh = MinHash::new(scaled, 21, Molecule::Dna, 42, false, 0);
    let mut model: BTreeMap<u64, u64> = BTreeMap::new();

    for hash in &hashes {
        mh.add_hash(*hash);
        if *hash <= max_hash {
            *model.entry(*hash).or_insert(0) += 1;
        }
    }

    let expected: Vec<u64> = model.keys().cloned().collect();
    assert_eq!(mh.mins(), expected);
}
}

proptest! {
#[test]
fn add_hash_is_idempotent_unweighted(hashes in vec(u64::ANY, 1..200)) {
    let mut once = MinHash::new(0, 21, Molecule::Dna, 42, false, 100);
    let mut thrice = MinHash::new(0, 21, Molecule::Dna, 42, false, 100);

    for hash in &hashes {
        once.add_hash(*hash);
        for _ in 0..3 {
            thrice.add_hash(*hash);
        }
    }

    assert_eq!(once, thrice);
    assert_eq!(once.md5sum(), thrice.md5sum());
}
}

#[test]
fn weighted_multiplicity() {
    let mut mh = MinHash::new(0, 21, Molecule::Dna, 42, true, 10);
    for _ in 0..7 {
        mh.add_hash(42);
    }
    assert_eq!(mh.abunds(), Some(vec![7]));
}

proptest! {
#[test]
fn merge_commutative_associative(
    h1 in vec(u64::ANY, 0..500),
    h2 in vec(u64::ANY, 0..500),
    h3 in vec(u64::ANY, 0..500),
) {
    let template = MinHash::new(3, 21, Molecule::Dna, 42, true, 0);

    let mut a = template.clone();
    let mut b = template.clone();
    let mut c = template.clone();
    a.add_many(&h1).unwrap();
    b.add_many(&h2).unwrap();
    c.add_many(&h3).unwrap();

    // commutativity
    let mut ab = a.clone();
    ab.merge(&b).unwrap();
    let mut ba = b.clone();
    ba.merge(&a).unwrap();
    assert_eq!(ab, ba);

    // associativity
    let mut ab_c = ab.clone();
    ab_c.merge(&c).unwrap();

    let mut bc = b.clone();
    bc.merge(&c).unwrap();
    let mut a_bc = a.clone();
    a_bc.merge(&bc).unwrap();

    assert_eq!(ab_c, a_bc);
}
}

proptest! {
#[test]
fn intersection_matches_count_common(
    h1 in vec(u64::ANY, 0..500),
    h2 in vec(u64::ANY, 0..500),
) {
    let mut a = MinHash::new(3, 21, Molecule::Dna, 42, false, 0);
    let mut b = MinHash::new(3, 21, Molecule::Dna, 42, false, 0);
    a.add_many(&h1).unwrap();
    b.add_many(&h2).unwrap();

    let common = a.intersection(&b).unwrap();
    let common_rev = b.intersection(&a).unwrap();

    assert_eq!(common.mins(), common_rev.mins());
    assert_eq!(common.size() as u64, a.count_common(&b, false).unwrap());
    assert_eq!(a.count_common(&b, false).unwrap(), b.count_common(&a, false).unwrap());
}
}

proptest! {
#[test]
fn downsample_equals_from_scratch(hashes in vec(u64::ANY, 0..2000)) {
    let mut fine = MinHash::new(2, 21, Molecule::Dna, 42, true, 0);
    let mut coarse = MinHash::new(20, 21, Molecule::Dna, 42, true, 0);

    fine.add_many(&hashes).unwrap();
    coarse.add_many(&hashes).unwrap();

    let downsampled = fine.downsample_scaled(20).unwrap();
    assert_eq!(downsampled, coarse);
    assert_eq!(downsampled.md5sum(), coarse.md5sum());
}
}

#[test]
fn remove_many_and_clear() {
    let mut mh = MinHash::new(0, 21, Molecule::Dna, 42, true, 10);
    mh.add_many_with_abund(&[(1, 1), (2, 2), (3, 3)]).unwrap();

    mh.remove_many(&[1, 3, 99]).unwrap();
    assert_eq!(mh.mins(), vec![2]);
    assert_eq!(mh.abunds(), Some(vec![2]));

    mh.clear();
    assert!(mh.is_empty());
    assert_eq!(mh.abunds(), Some(vec![]));
}

#[test]
fn md5sum_depends_only_on_mins() {
    let mut a = MinHash::new(0, 21, Molecule::Dna, 42, true, 10);
    let mut b = MinHash::new(0, 21, Molecule::Dna, 42, false, 10);

    // same mins through different paths, with and without abundance
    a.add_many_with_abund(&[(3, 5), (1, 2)]).unwrap();
    b.add_many(&[1, 3]).unwrap();

    assert_eq!(a.md5sum(), b.md5sum());

    b.add_hash(2);
    assert_ne!(a.md5sum(), b.md5sum());
}

#[test]
fn reconfiguration_requires_empty_sketch() {
    let mut mh = MinHash::new(0, 21, Molecule::Dna, 42, false, 10);
    mh.add_hash(1);

    assert!(matches!(
        mh.enable_abundance(),
        Err(Error::NonEmptyMinHash { .. })
    ));
    assert!(matches!(
        mh.set_molecule(Molecule::Protein),
        Err(Error::NonEmptyMinHash { .. })
    ));

    mh.clear();
    assert!(mh.enable_abundance().is_ok());
    assert!(mh.set_molecule(Molecule::Protein).is_ok());
}
