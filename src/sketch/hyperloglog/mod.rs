//! HyperLogLog cardinality estimation over k-mer hashes.
//!
//! Registers follow the usual HLL layout (the low `p` bits of a hash
//! pick a register, the rank of the remaining bits is the register
//! value); cardinality and set overlaps use the maximum likelihood
//! estimators from
//! https://oertl.github.io/hyperloglog-sketch-estimation-paper/paper/paper.pdf
//! as first applied to genomic sketching by dashing
//! https://genomebiology.biomedcentral.com/articles/10.1186/s13059-019-1875-0

use std::cmp;
use std::fs::File;
use std::io;
use std::path::Path;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};

use crate::encodings::Molecule;
use crate::signature::Sketchable;
use crate::sketch::minhash::MinHash;
use crate::Error;
use crate::HashIntoType;

pub mod estimators;
use estimators::CounterType;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct HyperLogLog {
    registers: Vec<CounterType>,
    p: usize,
    q: usize,
    ksize: usize,
}

impl HyperLogLog {
    pub fn with_error_rate(error_rate: f64, ksize: usize) -> Result<HyperLogLog, Error> {
        let p = f64::ceil(f64::log2(f64::powi(1.04 / error_rate, 2)));
        HyperLogLog::new(p as usize, ksize)
    }

    pub fn new(p: usize, ksize: usize) -> Result<HyperLogLog, Error> {
        if !(4..=18).contains(&p) {
            return Err(Error::HLLPrecisionBounds);
        }

        let size = 1_usize << p;
        let registers = vec![0; size];

        Ok(HyperLogLog {
            registers,
            ksize,
            p,
            q: 64 - p,
        })
    }

    pub fn add_hash(&mut self, hash: HashIntoType) {
        let value = hash >> self.p;
        let index = (hash - (value << self.p)) as usize;

        let leftmost = value.leading_zeros() + 1 - (self.p as u32);

        let old_value = self.registers[index];
        self.registers[index] = cmp::max(old_value, leftmost as CounterType);
    }

    pub fn add_word(&mut self, word: &[u8]) {
        let hash = crate::hash_murmur(word, 42);
        self.add_hash(hash);
    }

    pub fn add_many(&mut self, hashes: &[HashIntoType]) -> Result<(), Error> {
        for hash in hashes {
            self.add_hash(*hash);
        }
        Ok(())
    }

    pub fn merge(&mut self, other: &HyperLogLog) -> Result<(), Error> {
        self.check_compatible(other)?;
        self.registers
            .iter_mut()
            .zip(other.registers.iter())
            .for_each(|(a, b)| *a = cmp::max(*a, *b));
        Ok(())
    }

    pub fn cardinality(&self) -> usize {
        let counts = estimators::register_histogram(&self.registers, self.q);

        estimators::mle(&counts, self.p, self.q, 0.01) as usize
    }

    pub fn similarity(&self, other: &HyperLogLog) -> f64 {
        let (only_a, only_b, intersection) =
            estimators::joint_mle(&self.registers, &other.registers, self.p, self.q);

        intersection as f64 / (only_a + only_b + intersection) as f64
    }

    pub fn containment(&self, other: &HyperLogLog) -> f64 {
        let (only_a, _, intersection) =
            estimators::joint_mle(&self.registers, &other.registers, self.p, self.q);

        intersection as f64 / (only_a + intersection) as f64
    }

    pub fn intersection(&self, other: &HyperLogLog) -> usize {
        let (_, _, intersection) =
            estimators::joint_mle(&self.registers, &other.registers, self.p, self.q);

        intersection
    }

    /// Estimated overlap with a MinHash sketch: the retained hashes are
    /// fed, in ascending order, into a register set of the same shape,
    /// and the intersection is estimated jointly.
    pub fn matches(&self, mh: &MinHash) -> usize {
        let mut other = HyperLogLog {
            registers: vec![0; self.registers.len()],
            p: self.p,
            q: self.q,
            ksize: self.ksize,
        };

        for h in mh.iter_mins() {
            other.add_hash(*h);
        }

        self.intersection(&other)
    }

    /// Update this estimator with every hash retained by a MinHash
    /// sketch, in ascending order.
    pub fn update_mh(&mut self, mh: &MinHash) {
        for h in mh.iter_mins() {
            self.add_hash(*h);
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        self.save_to_writer(&mut File::create(path)?)?;
        Ok(())
    }

    pub fn save_to_writer<W>(&self, wtr: &mut W) -> Result<(), Error>
    where
        W: io::Write,
    {
        wtr.write_all(b"HLL")?;
        wtr.write_u8(1)?; // version
        wtr.write_u8(self.p as u8)?; // bits used for register indexing
        wtr.write_u8(self.q as u8)?; // bits used for counting leading zeroes
        wtr.write_u8(self.ksize as u8)?; // ksize
        wtr.write_all(self.registers.as_slice())?;

        Ok(())
    }

    pub fn from_reader<R>(rdr: R) -> Result<HyperLogLog, Error>
    where
        R: io::Read,
    {
        let (mut rdr, _format) = niffler::get_reader(Box::new(rdr))?;

        let magic = rdr.read_u24::<BigEndian>()?;
        if magic != 0x484c4c {
            return Err(Error::ReadData {
                message: "invalid HLL magic number".into(),
            });
        }

        let version = rdr.read_u8()?;
        if version != 1 {
            return Err(Error::ReadData {
                message: format!("unsupported HLL version: {}", version),
            });
        }

        let p = rdr.read_u8()? as usize;
        let q = rdr.read_u8()? as usize;

        let ksize = rdr.read_u8()? as usize;
        let n_registers = 1 << p;

        let mut registers = vec![0u8; n_registers];
        rdr.read_exact(&mut registers)?;

        Ok(HyperLogLog {
            registers,
            p,
            q,
            ksize,
        })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<HyperLogLog, Error> {
        let mut reader = io::BufReader::new(File::open(path)?);
        HyperLogLog::from_reader(&mut reader)
    }
}

impl Sketchable for HyperLogLog {
    fn size(&self) -> usize {
        self.registers.len()
    }

    fn to_vec(&self) -> Vec<u64> {
        self.registers.iter().map(|x| *x as u64).collect()
    }

    fn ksize(&self) -> usize {
        self.ksize
    }

    fn seed(&self) -> u64 {
        42
    }

    fn molecule(&self) -> Molecule {
        Molecule::Dna
    }

    fn add_hash(&mut self, hash: HashIntoType) {
        HyperLogLog::add_hash(self, hash);
    }

    fn check_compatible(&self, other: &HyperLogLog) -> Result<(), Error> {
        if self.ksize != other.ksize {
            Err(Error::MismatchKSizes)
        } else if self.registers.len() != other.registers.len() {
            Err(Error::MismatchNum {
                n1: self.registers.len() as u32,
                n2: other.registers.len() as u32,
            })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod test {
    use std::io::{BufReader, BufWriter};

    use super::HyperLogLog;

    #[test]
    fn precision_bounds() {
        assert!(HyperLogLog::new(3, 21).is_err());
        assert!(HyperLogLog::new(19, 21).is_err());
        assert!(HyperLogLog::new(4, 21).is_ok());
        assert!(HyperLogLog::new(18, 21).is_ok());
    }

    #[test]
    fn hll_cardinality() {
        const ERR_RATE: f64 = 0.01;
        const N_UNIQUE: usize = 20000;

        let mut hll = HyperLogLog::with_error_rate(ERR_RATE, 21).unwrap();

        for i in 0..N_UNIQUE {
            let word = format!("kmer-{}", i);
            hll.add_word(word.as_bytes());
        }

        // a few standard errors of slack over the configured rate
        let abs_error = (1. - (hll.cardinality() as f64 / N_UNIQUE as f64)).abs();
        assert!(abs_error < 3. * ERR_RATE, "{}", abs_error);
    }

    #[test]
    fn hll_merge_matches_union() {
        let mut hll1 = HyperLogLog::with_error_rate(0.01, 21).unwrap();
        let mut hll2 = HyperLogLog::with_error_rate(0.01, 21).unwrap();
        let mut hllu = HyperLogLog::with_error_rate(0.01, 21).unwrap();

        for i in 0..5000 {
            let word = format!("kmer-{}", i);
            let shifted = format!("kmer-{}", i + 2500);

            hll1.add_word(word.as_bytes());
            hll2.add_word(shifted.as_bytes());
            hllu.add_word(word.as_bytes());
            hllu.add_word(shifted.as_bytes());
        }

        hll1.merge(&hll2).unwrap();

        // merging register sets is exactly the register-wise max, so the
        // merged estimator equals the one fed the union directly
        assert_eq!(hll1, hllu);

        let sim = hll1.similarity(&hllu);
        assert!((1. - sim).abs() < 0.01, "{}", sim);
    }

    #[test]
    fn save_load_hll() {
        let mut hll = HyperLogLog::with_error_rate(0.01, 1).expect("error building HLL");
        for i in 1..5000 {
            hll.add_hash(i)
        }

        let mut buf = Vec::new();
        {
            let mut writer = BufWriter::new(&mut buf);
            hll.save_to_writer(&mut writer).unwrap();
        }

        let mut reader = BufReader::new(&buf[..]);
        let hll_new: HyperLogLog = HyperLogLog::from_reader(&mut reader).expect("Loading error");

        assert_eq!(hll_new, hll);
    }
}
