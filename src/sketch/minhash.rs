use std::borrow::Cow;
use std::cmp::Ordering;
use std::f64::consts::PI;
use std::fmt::Write;
use std::sync::Mutex;

use serde::de::Deserializer;
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::encodings::Molecule;
use crate::hash_murmur;
use crate::signature::Sketchable;
use crate::sketch::hyperloglog::HyperLogLog;
use crate::Error;

pub fn max_hash_for_scaled(scaled: u64) -> u64 {
    match scaled {
        0 => 0,
        1 => u64::MAX,
        _ => (u64::MAX as f64 / scaled as f64) as u64,
    }
}

pub fn scaled_for_max_hash(max_hash: u64) -> u64 {
    match max_hash {
        0 => 0,
        _ => u64::MAX / max_hash,
    }
}

/// A bounded MinHash sketch of a k-mer set.
///
/// Two complementary sampling regimes are supported: bottom-`num`
/// sampling (keep the `num` smallest hashes seen) and scaled sampling
/// (keep every hash at or below `max_hash`). When both are configured,
/// `max_hash` filters strictly and `num` is not enforced.
///
/// With `track_abundance` the sketch also keeps the multiplicity of each
/// retained hash, in a parallel array.
#[derive(Debug, TypedBuilder)]
pub struct MinHash {
    num: u32,
    ksize: u32,

    #[builder(default = Molecule::Dna)]
    molecule: Molecule,

    #[builder(default = 42u64)]
    seed: u64,

    #[builder(default = 0u64)]
    max_hash: u64,

    #[builder(default)]
    mins: Vec<u64>,

    #[builder(default)]
    abunds: Option<Vec<u64>>,

    #[builder(default)]
    md5sum: Mutex<Option<String>>,
}

impl PartialEq for MinHash {
    fn eq(&self, other: &MinHash) -> bool {
        self.num == other.num
            && self.ksize == other.ksize
            && self.molecule == other.molecule
            && self.seed == other.seed
            && self.max_hash == other.max_hash
            && self.mins == other.mins
            && self.abunds == other.abunds
    }
}

impl Eq for MinHash {}

impl Clone for MinHash {
    fn clone(&self) -> Self {
        MinHash {
            num: self.num,
            ksize: self.ksize,
            molecule: self.molecule,
            seed: self.seed,
            max_hash: self.max_hash,
            mins: self.mins.clone(),
            abunds: self.abunds.clone(),
            md5sum: Mutex::new(Some(self.md5sum())),
        }
    }
}

impl Default for MinHash {
    fn default() -> MinHash {
        MinHash {
            num: 1000,
            ksize: 21,
            molecule: Molecule::Dna,
            seed: 42,
            max_hash: 0,
            mins: Vec::with_capacity(1000),
            abunds: None,
            md5sum: Mutex::new(None),
        }
    }
}

impl Serialize for MinHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let n_fields = match &self.abunds {
            Some(_) => 8,
            _ => 7,
        };

        let mut partial = serializer.serialize_struct("MinHash", n_fields)?;
        partial.serialize_field("num", &self.num)?;
        partial.serialize_field("ksize", &self.ksize)?;
        partial.serialize_field("seed", &self.seed)?;
        partial.serialize_field("max_hash", &self.max_hash)?;
        partial.serialize_field("mins", &self.mins)?;
        partial.serialize_field("md5sum", &self.md5sum())?;

        if let Some(abunds) = &self.abunds {
            partial.serialize_field("abundances", abunds)?;
        }

        partial.serialize_field("molecule", &self.molecule.to_string())?;

        partial.end()
    }
}

impl<'de> Deserialize<'de> for MinHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct TempSketch {
            num: u32,
            ksize: u32,
            seed: u64,
            max_hash: u64,
            md5sum: String,
            mins: Vec<u64>,
            abundances: Option<Vec<u64>>,
            molecule: String,
        }

        let tmp = TempSketch::deserialize(deserializer)?;

        let num = if tmp.max_hash != 0 { 0 } else { tmp.num };
        let molecule = Molecule::try_from(tmp.molecule.as_str())
            .map_err(serde::de::Error::custom)?;

        // Ordered mins are an invariant here, but files written by other
        // tools are not guaranteed to uphold it.
        let (mins, abunds) = if let Some(abunds) = tmp.abundances {
            let mut values: Vec<(u64, u64)> =
                tmp.mins.into_iter().zip(abunds.into_iter()).collect();
            values.sort_unstable();
            let mins = values.iter().map(|(v, _)| *v).collect();
            let abunds = values.iter().map(|(_, v)| *v).collect();
            (mins, Some(abunds))
        } else {
            let mut mins = tmp.mins;
            mins.sort_unstable();
            (mins, None)
        };

        Ok(MinHash {
            num,
            ksize: tmp.ksize,
            seed: tmp.seed,
            max_hash: tmp.max_hash,
            md5sum: Mutex::new(Some(tmp.md5sum)),
            mins,
            abunds,
            molecule,
        })
    }
}

impl MinHash {
    pub fn new(
        scaled: u64,
        ksize: u32,
        molecule: Molecule,
        seed: u64,
        track_abundance: bool,
        num: u32,
    ) -> MinHash {
        let mins = if num > 0 {
            Vec::with_capacity(num as usize)
        } else {
            Vec::with_capacity(1000)
        };

        let abunds = if track_abundance {
            Some(Vec::with_capacity(mins.capacity()))
        } else {
            None
        };

        let max_hash = max_hash_for_scaled(scaled);

        MinHash {
            num,
            ksize,
            molecule,
            seed,
            max_hash,
            mins,
            abunds,
            md5sum: Mutex::new(None),
        }
    }

    /// An empty sketch with the same configuration as this one.
    fn empty_like(&self) -> MinHash {
        MinHash {
            num: self.num,
            ksize: self.ksize,
            molecule: self.molecule,
            seed: self.seed,
            max_hash: self.max_hash,
            mins: vec![],
            abunds: self.abunds.as_ref().map(|_| vec![]),
            md5sum: Mutex::new(None),
        }
    }

    pub fn num(&self) -> u32 {
        self.num
    }

    pub fn max_hash(&self) -> u64 {
        self.max_hash
    }

    pub fn scaled(&self) -> u64 {
        scaled_for_max_hash(self.max_hash)
    }

    pub fn is_protein(&self) -> bool {
        self.molecule.protein()
    }

    pub fn dayhoff(&self) -> bool {
        self.molecule.dayhoff()
    }

    pub fn hp(&self) -> bool {
        self.molecule.hp()
    }

    pub fn is_empty(&self) -> bool {
        self.mins.is_empty()
    }

    pub fn clear(&mut self) {
        self.mins.clear();
        if let Some(ref mut abunds) = self.abunds {
            abunds.clear();
        }
        self.reset_md5sum();
    }

    pub fn track_abundance(&self) -> bool {
        self.abunds.is_some()
    }

    pub fn enable_abundance(&mut self) -> Result<(), Error> {
        if !self.mins.is_empty() {
            return Err(Error::NonEmptyMinHash {
                message: "track_abundance=True".into(),
            });
        }

        self.abunds = Some(vec![]);

        Ok(())
    }

    pub fn disable_abundance(&mut self) {
        self.abunds = None;
    }

    pub fn set_molecule(&mut self, molecule: Molecule) -> Result<(), Error> {
        if self.molecule == molecule {
            return Ok(());
        }

        if !self.is_empty() {
            return Err(Error::NonEmptyMinHash {
                message: "molecule".into(),
            });
        }

        self.molecule = molecule;
        Ok(())
    }

    fn reset_md5sum(&self) {
        let mut cached = self.md5sum.lock().unwrap();
        if cached.is_some() {
            *cached = None;
        }
    }

    /// MD5 digest of the retained hashes, as lowercase hex.
    ///
    /// The digest covers the ascending decimal rendering of `mins` and
    /// nothing else, so it changes under any modification of the sketch
    /// contents. Computed lazily and cached until the next mutation.
    pub fn md5sum(&self) -> String {
        let mut cached = self.md5sum.lock().unwrap();
        if cached.is_none() {
            let mut buffer = String::with_capacity(20);
            let mut ctx = md5::Context::new();

            for x in &self.mins {
                write!(&mut buffer, "{}", x).unwrap();
                ctx.consume(&buffer);
                buffer.clear();
            }
            *cached = Some(format!("{:x}", ctx.compute()));
        }
        cached.clone().unwrap()
    }

    pub fn add_word(&mut self, word: &[u8]) {
        let hash = hash_murmur(word, self.seed);
        self.add_hash(hash);
    }

    pub fn add_hash(&mut self, hash: u64) {
        self.add_hash_with_abundance(hash, 1);
    }

    pub fn add_hash_with_abundance(&mut self, hash: u64, abundance: u64) {
        if self.max_hash != 0 {
            if hash > self.max_hash {
                return;
            }
        } else if self.num != 0 && self.mins.len() >= self.num as usize {
            if let Some(&largest) = self.mins.last() {
                // full bottom-num sketch, and this hash cannot improve it
                if hash > largest {
                    return;
                }
            }
        }

        if abundance == 0 {
            self.remove_hash(hash);
            return;
        }

        match self.mins.binary_search(&hash) {
            Ok(pos) => {
                if let Some(ref mut abunds) = self.abunds {
                    abunds[pos] += abundance;
                }
            }
            Err(pos) => {
                self.mins.insert(pos, hash);
                if let Some(ref mut abunds) = self.abunds {
                    abunds.insert(pos, abundance);
                }

                if self.num != 0
                    && self.max_hash == 0
                    && self.mins.len() > self.num as usize
                {
                    self.mins.pop();
                    if let Some(ref mut abunds) = self.abunds {
                        abunds.pop();
                    }
                }
                self.reset_md5sum();
            }
        }
    }

    /// Set the exact abundance of a hash, inserting it if needed.
    ///
    /// An abundance of zero removes the hash.
    pub fn set_hash_with_abundance(&mut self, hash: u64, abundance: u64) {
        if abundance == 0 {
            self.remove_hash(hash);
            return;
        }

        match self.mins.binary_search(&hash) {
            Ok(pos) => {
                if let Some(ref mut abunds) = self.abunds {
                    abunds[pos] = abundance;
                }
            }
            Err(_) => self.add_hash_with_abundance(hash, abundance),
        }
    }

    pub fn set_abundances(&mut self, pairs: &[(u64, u64)], clear: bool) -> Result<(), Error> {
        if clear {
            self.clear();
        }

        let mut pairs = pairs.to_vec();
        pairs.sort_unstable();

        for (hash, abundance) in pairs {
            self.set_hash_with_abundance(hash, abundance);
        }

        Ok(())
    }

    pub fn remove_hash(&mut self, hash: u64) {
        if let Ok(pos) = self.mins.binary_search(&hash) {
            self.mins.remove(pos);
            if let Some(ref mut abunds) = self.abunds {
                abunds.remove(pos);
            }
            self.reset_md5sum();
        }
    }

    pub fn remove_many(&mut self, hashes: &[u64]) -> Result<(), Error> {
        for hash in hashes {
            self.remove_hash(*hash);
        }
        Ok(())
    }

    pub fn remove_from(&mut self, other: &MinHash) -> Result<(), Error> {
        for hash in &other.mins {
            self.remove_hash(*hash);
        }
        Ok(())
    }

    pub fn add_many(&mut self, hashes: &[u64]) -> Result<(), Error> {
        for hash in hashes {
            self.add_hash(*hash);
        }
        Ok(())
    }

    pub fn add_many_with_abund(&mut self, pairs: &[(u64, u64)]) -> Result<(), Error> {
        for (hash, abundance) in pairs {
            self.add_hash_with_abundance(*hash, *abundance);
        }
        Ok(())
    }

    pub fn add_from(&mut self, other: &MinHash) -> Result<(), Error> {
        for hash in &other.mins {
            self.add_hash(*hash);
        }
        Ok(())
    }

    /// Union with a compatible sketch.
    ///
    /// Abundances of shared hashes add; if only one side tracks
    /// abundance, the other side's elements count as one each. With a
    /// `num` cap active the union keeps the `num` smallest.
    pub fn merge(&mut self, other: &MinHash) -> Result<(), Error> {
        self.check_compatible(other)?;

        let weighted = self.abunds.is_some();
        let capacity = self.mins.len() + other.mins.len();
        let mut merged: Vec<u64> = Vec::with_capacity(capacity);
        let mut merged_abunds: Vec<u64> = Vec::with_capacity(if weighted { capacity } else { 0 });

        let abund_at = |abunds: &Option<Vec<u64>>, pos: usize| -> u64 {
            abunds.as_ref().map_or(1, |a| a[pos])
        };

        let (mut i, mut j) = (0, 0);
        while i < self.mins.len() && j < other.mins.len() {
            match self.mins[i].cmp(&other.mins[j]) {
                Ordering::Less => {
                    merged.push(self.mins[i]);
                    if weighted {
                        merged_abunds.push(abund_at(&self.abunds, i));
                    }
                    i += 1;
                }
                Ordering::Greater => {
                    merged.push(other.mins[j]);
                    if weighted {
                        merged_abunds.push(abund_at(&other.abunds, j));
                    }
                    j += 1;
                }
                Ordering::Equal => {
                    merged.push(self.mins[i]);
                    if weighted {
                        merged_abunds
                            .push(abund_at(&self.abunds, i) + abund_at(&other.abunds, j));
                    }
                    i += 1;
                    j += 1;
                }
            }
        }

        while i < self.mins.len() {
            merged.push(self.mins[i]);
            if weighted {
                merged_abunds.push(abund_at(&self.abunds, i));
            }
            i += 1;
        }
        while j < other.mins.len() {
            merged.push(other.mins[j]);
            if weighted {
                merged_abunds.push(abund_at(&other.abunds, j));
            }
            j += 1;
        }

        if self.num != 0 && self.max_hash == 0 && merged.len() > self.num as usize {
            merged.truncate(self.num as usize);
            merged_abunds.truncate(self.num as usize);
        }

        self.mins = merged;
        if weighted {
            self.abunds = Some(merged_abunds);
        }
        self.reset_md5sum();

        Ok(())
    }

    /// Intersection with a compatible sketch, as a new sketch inheriting
    /// this sketch's configuration. When weighted, the abundance of each
    /// shared hash is the sum of the two contributions.
    pub fn intersection(&self, other: &MinHash) -> Result<MinHash, Error> {
        self.check_compatible(other)?;

        let mut result = self.empty_like();

        let (mut i, mut j) = (0, 0);
        while i < self.mins.len() && j < other.mins.len() {
            match self.mins[i].cmp(&other.mins[j]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    result.mins.push(self.mins[i]);
                    if let Some(ref mut abunds) = result.abunds {
                        let a = self.abunds.as_ref().map_or(1, |a| a[i]);
                        let b = other.abunds.as_ref().map_or(1, |a| a[j]);
                        abunds.push(a + b);
                    }
                    i += 1;
                    j += 1;
                }
            }
        }

        Ok(result)
    }

    /// Size of the hash intersection with a compatible sketch.
    pub fn count_common(&self, other: &MinHash, downsample: bool) -> Result<u64, Error> {
        if downsample && (self.max_hash != other.max_hash || self.num != other.num) {
            let (a, b) = self.downsampled_pair(other)?;
            return a.count_common(&b, false);
        }

        self.check_compatible(other)?;
        let (common, _) = merge_scan(&self.mins, &other.mins);
        Ok(common)
    }

    /// Intersection and union sizes used by [`MinHash::jaccard`].
    ///
    /// For bottom-`num` sketches the union is itself a bottom-`num`
    /// sketch, so both counts are taken against the merged sketch.
    pub fn intersection_size(&self, other: &MinHash) -> Result<(u64, u64), Error> {
        self.check_compatible(other)?;

        if self.num != 0 && self.max_hash == 0 {
            let mut combined = self.empty_like();
            combined.merge(self)?;
            combined.merge(other)?;

            let common = self
                .mins
                .iter()
                .filter(|&&h| {
                    other.mins.binary_search(&h).is_ok()
                        && combined.mins.binary_search(&h).is_ok()
                })
                .count();

            Ok((common as u64, combined.mins.len() as u64))
        } else {
            Ok(merge_scan(&self.mins, &other.mins))
        }
    }

    /// Jaccard similarity, ignoring abundance.
    pub fn jaccard(&self, other: &MinHash) -> Result<f64, Error> {
        let (common, union_size) = self.intersection_size(other)?;
        Ok(common as f64 / u64::max(1, union_size) as f64)
    }

    /// Angular similarity of the abundance vectors, aligned on the union
    /// of hashes: `1 - 2*acos(cos)/pi`. Falls back to Jaccard when
    /// either sketch does not track abundance; an empty operand yields 0.
    pub fn angular_similarity(&self, other: &MinHash) -> Result<f64, Error> {
        self.check_compatible(other)?;

        let (abunds, other_abunds) = match (&self.abunds, &other.abunds) {
            (Some(a), Some(b)) => (a, b),
            _ => return self.jaccard(other),
        };

        let a_sq: u64 = abunds.iter().map(|a| a * a).sum();
        let b_sq: u64 = other_abunds.iter().map(|a| a * a).sum();

        let mut prod: u64 = 0;
        let (mut i, mut j) = (0, 0);
        while i < self.mins.len() && j < other.mins.len() {
            match self.mins[i].cmp(&other.mins[j]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    prod += abunds[i] * other_abunds[j];
                    i += 1;
                    j += 1;
                }
            }
        }

        let norm_a = (a_sq as f64).sqrt();
        let norm_b = (b_sq as f64).sqrt();

        if norm_a == 0. || norm_b == 0. {
            return Ok(0.0);
        }

        let cos = f64::min(prod as f64 / (norm_a * norm_b), 1.);
        Ok(1. - 2. * cos.acos() / PI)
    }

    /// Similarity with a compatible sketch: Jaccard when unweighted or
    /// `ignore_abundance` is set, angular similarity otherwise. With
    /// `downsample` the sketches are first reconciled to the coarser
    /// sampling parameters.
    pub fn similarity(
        &self,
        other: &MinHash,
        ignore_abundance: bool,
        downsample: bool,
    ) -> Result<f64, Error> {
        if downsample && (self.max_hash != other.max_hash || self.num != other.num) {
            let (a, b) = self.downsampled_pair(other)?;
            return a.similarity(&b, ignore_abundance, false);
        }

        if ignore_abundance || self.abunds.is_none() || other.abunds.is_none() {
            self.jaccard(other)
        } else {
            self.angular_similarity(other)
        }
    }

    /// Reconcile two sketches to comparable sampling parameters by
    /// downsampling the finer one: first to the smaller nonzero
    /// `max_hash`, then to the smaller nonzero `num`.
    fn downsampled_pair<'a>(
        &'a self,
        other: &'a MinHash,
    ) -> Result<(Cow<'a, MinHash>, Cow<'a, MinHash>), Error> {
        // max_hash == 0 means no threshold, which is the finest setting
        fn effective(mh: &MinHash) -> u64 {
            if mh.max_hash == 0 {
                u64::MAX
            } else {
                mh.max_hash
            }
        }

        let mut a = Cow::Borrowed(self);
        let mut b = Cow::Borrowed(other);

        if effective(&a) != effective(&b) {
            let target = u64::min(effective(&a), effective(&b));
            if effective(&a) > target {
                a = Cow::Owned(a.downsample_max_hash(target)?);
            } else {
                b = Cow::Owned(b.downsample_max_hash(target)?);
            }
        }

        if a.num != b.num && a.num != 0 && b.num != 0 {
            let target = u32::min(a.num, b.num);
            if a.num > target {
                a = Cow::Owned(a.downsample_num(target)?);
            } else {
                b = Cow::Owned(b.downsample_num(target)?);
            }
        }

        Ok((a, b))
    }

    /// A copy restricted to hashes at or below `max_hash`.
    ///
    /// Requires `max_hash <= self.max_hash()` when a threshold is
    /// already active; the restriction is exact under the sampling
    /// model.
    pub fn downsample_max_hash(&self, max_hash: u64) -> Result<MinHash, Error> {
        if self.max_hash != 0 && (max_hash == 0 || max_hash > self.max_hash) {
            return Err(Error::MismatchScaled);
        }

        let mut new_mh = self.empty_like();
        new_mh.max_hash = max_hash;

        let keep = self
            .mins
            .iter()
            .take_while(|&&h| max_hash == 0 || h <= max_hash)
            .count();
        new_mh.mins.extend_from_slice(&self.mins[..keep]);
        if let (Some(new_abunds), Some(abunds)) = (&mut new_mh.abunds, &self.abunds) {
            new_abunds.extend_from_slice(&abunds[..keep]);
        }

        Ok(new_mh)
    }

    /// A copy downsampled to a coarser scaled value.
    pub fn downsample_scaled(&self, scaled: u64) -> Result<MinHash, Error> {
        self.downsample_max_hash(max_hash_for_scaled(scaled))
    }

    /// A copy retaining only the `num` smallest hashes.
    ///
    /// Requires `num <= self.num()` when a cap is already active.
    pub fn downsample_num(&self, num: u32) -> Result<MinHash, Error> {
        if self.num != 0 && num > self.num {
            return Err(Error::MismatchNum {
                n1: self.num,
                n2: num,
            });
        }

        let mut new_mh = self.empty_like();
        new_mh.num = num;

        let keep = if num == 0 {
            self.mins.len()
        } else {
            usize::min(num as usize, self.mins.len())
        };
        new_mh.mins.extend_from_slice(&self.mins[..keep]);
        if let (Some(new_abunds), Some(abunds)) = (&mut new_mh.abunds, &self.abunds) {
            new_abunds.extend_from_slice(&abunds[..keep]);
        }

        Ok(new_mh)
    }

    pub fn mins(&self) -> Vec<u64> {
        self.mins.clone()
    }

    pub fn iter_mins(&self) -> impl Iterator<Item = &u64> {
        self.mins.iter()
    }

    pub fn abunds(&self) -> Option<Vec<u64>> {
        self.abunds.clone()
    }

    pub fn to_vec_abunds(&self) -> Vec<(u64, u64)> {
        if let Some(abunds) = &self.abunds {
            self.mins
                .iter()
                .cloned()
                .zip(abunds.iter().cloned())
                .collect()
        } else {
            self.mins
                .iter()
                .cloned()
                .zip(std::iter::repeat(1))
                .collect()
        }
    }

    /// Seed a HyperLogLog cardinality estimator from the retained
    /// hashes, fed in ascending order.
    pub fn as_hll(&self) -> Result<HyperLogLog, Error> {
        let mut hll = HyperLogLog::with_error_rate(0.01, self.ksize())?;

        for h in &self.mins {
            hll.add_hash(*h);
        }

        Ok(hll)
    }
}

impl Sketchable for MinHash {
    fn size(&self) -> usize {
        self.mins.len()
    }

    fn to_vec(&self) -> Vec<u64> {
        self.mins.clone()
    }

    fn ksize(&self) -> usize {
        self.ksize as usize
    }

    fn seed(&self) -> u64 {
        self.seed
    }

    fn molecule(&self) -> Molecule {
        self.molecule
    }

    fn add_hash(&mut self, hash: u64) {
        self.add_hash_with_abundance(hash, 1);
    }

    fn check_compatible(&self, other: &MinHash) -> Result<(), Error> {
        if self.num != other.num {
            return Err(Error::MismatchNum {
                n1: self.num,
                n2: other.num,
            });
        }
        if self.ksize != other.ksize {
            return Err(Error::MismatchKSizes);
        }
        if self.molecule != other.molecule {
            return Err(Error::MismatchDNAProt);
        }
        if self.max_hash != other.max_hash {
            return Err(Error::MismatchScaled);
        }
        if self.seed != other.seed {
            return Err(Error::MismatchSeed);
        }
        Ok(())
    }
}

/// Walk two sorted hash lists, counting the intersection and union.
fn merge_scan(a: &[u64], b: &[u64]) -> (u64, u64) {
    let mut common = 0u64;
    let mut union_size = 0u64;

    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        union_size += 1;
        match a[i].cmp(&b[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                common += 1;
                i += 1;
                j += 1;
            }
        }
    }
    union_size += (a.len() - i) as u64;
    union_size += (b.len() - j) as u64;

    (common, union_size)
}
