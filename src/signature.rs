//! # Compressed representations of genomic data
//!
//! A signature is a named collection of sketches for one dataset,
//! serialized as a JSON envelope (optionally gzip-compressed).

use std::borrow::Cow;
use std::fs::File;
use std::io;
use std::path::Path;

use cfg_if::cfg_if;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::encodings::{aa_to_dayhoff, aa_to_hp, revcomp, to_aa, Molecule, VALID};
use crate::hash_murmur;
use crate::sketch::minhash::MinHash;
use crate::sketch::Sketch;
use crate::Error;

/// Operations shared by every sketch type.
///
/// Sequence intake is provided on top of [`Sketchable::add_hash`]: the
/// default [`Sketchable::add_sequence`] and [`Sketchable::add_protein`]
/// run the k-mer decomposition appropriate for the sketch's molecule
/// type and feed the resulting hashes in.
pub trait Sketchable {
    fn size(&self) -> usize;
    fn to_vec(&self) -> Vec<u64>;
    fn ksize(&self) -> usize;
    fn seed(&self) -> u64;
    fn molecule(&self) -> Molecule;
    fn add_hash(&mut self, hash: u64);
    fn check_compatible(&self, other: &Self) -> Result<(), Error>;

    fn add_sequence(&mut self, seq: &[u8], force: bool) -> Result<(), Error> {
        let ksize = self.ksize();
        let molecule = self.molecule();
        let seed = self.seed();

        for_each_kmer_hash(seq, ksize, force, false, molecule, seed, |hash| {
            self.add_hash(hash)
        })
    }

    fn add_protein(&mut self, seq: &[u8]) -> Result<(), Error> {
        let ksize = self.ksize();
        let molecule = self.molecule();
        let seed = self.seed();

        for_each_kmer_hash(seq, ksize, false, true, molecule, seed, |hash| {
            self.add_hash(hash)
        })
    }
}

/// Decompose a sequence into k-mer hashes, calling `emit` for each one.
///
/// For DNA sketches, each window is folded with its reverse complement
/// and the lexicographically smaller of the two is hashed; windows with
/// characters outside `ACGT` fail with `InvalidDNA`, or are skipped when
/// `force` is set. For protein-family sketches fed nucleotides, all six
/// reading frames are translated and hashed over windows of `ksize / 3`
/// residues. With `is_protein` the input is taken as amino acids
/// directly (re-encoded first for the reduced alphabets).
///
/// Sequences shorter than one window emit nothing.
pub fn for_each_kmer_hash<F>(
    seq: &[u8],
    ksize: usize,
    force: bool,
    is_protein: bool,
    molecule: Molecule,
    seed: u64,
    mut emit: F,
) -> Result<(), Error>
where
    F: FnMut(u64),
{
    let sequence = seq.to_ascii_uppercase();

    if is_protein {
        let aa_ksize = ksize / 3;
        if aa_ksize == 0 || sequence.len() < aa_ksize {
            return Ok(());
        }

        let encoded: Cow<'_, [u8]> = match molecule {
            Molecule::Protein => Cow::from(&sequence[..]),
            Molecule::Dayhoff => sequence.iter().map(|&aa| aa_to_dayhoff(aa)).collect(),
            Molecule::Hp => sequence.iter().map(|&aa| aa_to_hp(aa)).collect(),
            Molecule::Dna => {
                return Err(Error::InvalidHashFunction {
                    function: "dna".into(),
                })
            }
        };

        for kmer in encoded.windows(aa_ksize) {
            emit(hash_murmur(kmer, seed));
        }
        return Ok(());
    }

    if molecule.dna() {
        if ksize == 0 || sequence.len() < ksize {
            return Ok(());
        }

        let rc = revcomp(&sequence);
        let len = sequence.len();

        'windows: for i in 0..=(len - ksize) {
            let kmer = &sequence[i..i + ksize];

            for b in kmer {
                if !VALID[*b as usize] {
                    if force {
                        continue 'windows;
                    }
                    return Err(Error::InvalidDNA {
                        message: String::from_utf8_lossy(kmer).into(),
                    });
                }
            }

            // the window starting at i pairs with the reverse complement
            // window ending at len - i
            let krc = &rc[len - ksize - i..len - i];
            emit(hash_murmur(kmer.min(krc), seed));
        }
        return Ok(());
    }

    // nucleotide input for a protein-family sketch: translate all three
    // forward frames and all three reverse complement frames
    let aa_ksize = ksize / 3;
    if aa_ksize == 0 || sequence.len() < ksize {
        return Ok(());
    }

    let rc = revcomp(&sequence);
    for frame in 0..3 {
        for strand in [&sequence, &rc] {
            if strand.len() <= frame {
                continue;
            }
            let aa = to_aa(&strand[frame..], molecule.dayhoff(), molecule.hp())?;
            for kmer in aa.windows(aa_ksize) {
                emit(hash_murmur(kmer, seed));
            }
        }
    }

    Ok(())
}

#[derive(Serialize, Deserialize, Debug, Clone, TypedBuilder)]
pub struct Signature {
    #[serde(default = "default_class")]
    #[builder(default = default_class())]
    class: String,

    #[serde(default)]
    #[builder(default)]
    email: String,

    #[builder(setter(into))]
    hash_function: String,

    #[builder(default)]
    pub(crate) filename: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub(crate) name: Option<String>,

    #[serde(default = "default_license")]
    #[builder(default = default_license())]
    license: String,

    pub(crate) signatures: Vec<Sketch>,

    #[serde(default = "default_version")]
    #[builder(default = default_version())]
    version: f64,
}

fn default_class() -> String {
    "sourmash_signature".to_string()
}

fn default_license() -> String {
    "CC0".to_string()
}

fn default_version() -> f64 {
    0.4
}

impl Signature {
    pub fn name(&self) -> String {
        if let Some(name) = &self.name {
            name.clone()
        } else if let Some(filename) = &self.filename {
            filename.clone()
        } else {
            self.md5sum()
        }
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = Some(name.into())
    }

    pub fn filename(&self) -> String {
        if let Some(filename) = &self.filename {
            filename.clone()
        } else {
            "".into()
        }
    }

    pub fn set_filename(&mut self, name: &str) {
        self.filename = Some(name.into())
    }

    pub fn size(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    pub fn sketches(&self) -> Vec<Sketch> {
        self.signatures.clone()
    }

    pub fn reset_sketches(&mut self) {
        self.signatures = vec![];
    }

    pub fn push(&mut self, sketch: Sketch) {
        self.signatures.push(sketch);
    }

    pub fn license(&self) -> String {
        self.license.clone()
    }

    pub fn class(&self) -> String {
        self.class.clone()
    }

    pub fn hash_function(&self) -> String {
        self.hash_function.clone()
    }

    pub fn email(&self) -> String {
        self.email.clone()
    }

    /// MD5 digest of the contained MinHash when the signature holds
    /// exactly one; empty otherwise.
    pub fn md5sum(&self) -> String {
        if self.signatures.len() == 1 {
            if let Sketch::MinHash(mh) = &self.signatures[0] {
                return mh.md5sum();
            }
        }
        String::new()
    }

    /// The contained MinHash, for single-sketch signatures.
    pub fn minhash(&self) -> Option<&MinHash> {
        if self.signatures.len() != 1 {
            return None;
        }
        self.signatures.iter().find_map(|sk| {
            if let Sketch::MinHash(mh) = sk {
                Some(mh)
            } else {
                None
            }
        })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sketch> {
        self.signatures.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Sketch> {
        self.signatures.iter_mut()
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Signature>, Error> {
        let mut reader = io::BufReader::new(File::open(path)?);
        Signature::from_reader(&mut reader)
    }

    pub fn from_reader<R>(rdr: R) -> Result<Vec<Signature>, Error>
    where
        R: io::Read,
    {
        let (rdr, _format) = niffler::get_reader(Box::new(rdr))?;

        let sigs: Vec<Signature> = serde_json::from_reader(rdr)?;
        Ok(sigs)
    }

    /// Load signatures from a reader, splitting multi-sketch signatures
    /// apart and keeping only sketches matching the requested k-size and
    /// molecule type.
    pub fn load_signatures<R>(
        buf: R,
        ksize: Option<usize>,
        moltype: Option<Molecule>,
        _scaled: Option<u64>,
    ) -> Result<Vec<Signature>, Error>
    where
        R: io::Read,
    {
        let orig_sigs = Signature::from_reader(buf)?;

        let mut filtered = vec![];
        for sig in orig_sigs {
            for sketch in &sig.signatures {
                let keep = ksize.map_or(true, |k| k == sketch.ksize())
                    && moltype.map_or(true, |m| m == sketch.molecule());

                if keep {
                    let mut new_sig = sig.clone();
                    new_sig.signatures = vec![sketch.clone()];
                    filtered.push(new_sig);
                }
            }
        }

        Ok(filtered)
    }

    pub fn to_writer<W>(&self, writer: &mut W) -> Result<(), Error>
    where
        W: io::Write,
    {
        serde_json::to_writer(writer, &vec![&self])?;
        Ok(())
    }

    pub fn add_sequence(&mut self, seq: &[u8], force: bool) -> Result<(), Error> {
        cfg_if! {
        if #[cfg(feature = "parallel")] {
            self.signatures
                .par_iter_mut()
                .try_for_each(|sketch| {
                    sketch.add_sequence(seq, force) }
                )?;
        } else {
            for sketch in self.signatures.iter_mut() {
                sketch.add_sequence(seq, force)?;
            }
        }
        }

        Ok(())
    }

    pub fn add_protein(&mut self, seq: &[u8]) -> Result<(), Error> {
        cfg_if! {
        if #[cfg(feature = "parallel")] {
            self.signatures
                .par_iter_mut()
                .try_for_each(|sketch| {
                    sketch.add_protein(seq) }
                )?;
        } else {
            for sketch in self.signatures.iter_mut() {
                sketch.add_protein(seq)?;
            }
        }
        }

        Ok(())
    }
}

/// Write a batch of signatures as a JSON array, gzip-compressed when a
/// level is given. This is the "save buffer" counterpart of
/// [`Signature::from_reader`].
pub fn save_signatures<W>(
    sigs: &[Signature],
    writer: W,
    level: Option<niffler::compression::Level>,
) -> Result<(), Error>
where
    W: io::Write,
{
    match level {
        Some(level) => {
            let mut writer = niffler::get_writer(
                Box::new(writer),
                niffler::compression::Format::Gzip,
                level,
            )?;
            serde_json::to_writer(&mut writer, &sigs)?;
        }
        None => {
            serde_json::to_writer(writer, &sigs)?;
        }
    }
    Ok(())
}

impl Default for Signature {
    fn default() -> Signature {
        Signature {
            class: default_class(),
            email: "".to_string(),
            hash_function: "0.murmur64".to_string(),
            license: default_license(),
            filename: None,
            name: None,
            signatures: Vec::<Sketch>::new(),
            version: default_version(),
        }
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Signature) -> bool {
        self.name == other.name
            && self.filename == other.filename
            && self.signatures == other.signatures
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sketch::minhash::MinHash;

    #[test]
    fn add_sequence_fans_out() {
        let sketches = vec![
            Sketch::MinHash(MinHash::new(0, 3, Molecule::Dna, 42, false, 10)),
            Sketch::MinHash(MinHash::new(0, 4, Molecule::Dna, 42, false, 10)),
        ];
        let mut sig = Signature::builder()
            .hash_function("0.murmur64")
            .signatures(sketches)
            .build();

        sig.add_sequence(b"ATGCG", false).unwrap();

        assert_eq!(sig.size(), 2);
        assert_eq!(sig.iter().next().unwrap().size(), 3);
        assert_eq!(sig.iter().nth(1).unwrap().size(), 2);
    }

    #[test]
    fn name_fallbacks() {
        let mut sig = Signature::default();
        sig.push(Sketch::MinHash(MinHash::new(0, 3, Molecule::Dna, 42, false, 10)));
        assert_eq!(sig.name(), sig.md5sum());

        sig.set_filename("reads.fa");
        assert_eq!(sig.name(), "reads.fa");

        sig.set_name("sample 1");
        assert_eq!(sig.name(), "sample 1");
    }

    #[test]
    fn six_frame_translation_is_strand_symmetric() {
        let mut fwd = MinHash::new(0, 9, Molecule::Protein, 42, false, 50);
        let mut rev = MinHash::new(0, 9, Molecule::Protein, 42, false, 50);

        let seq = b"ATGGCCATTGTAATGGGCCGCTGAAAGGGTGCCCGATAG";
        fwd.add_sequence(seq, false).unwrap();
        rev.add_sequence(&revcomp(seq), false).unwrap();

        assert!(fwd.size() > 0);
        assert_eq!(fwd.mins(), rev.mins());
    }
}
