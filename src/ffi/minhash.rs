use std::ffi::CStr;
use std::os::raw::c_char;
use std::slice;

use crate::encodings::Molecule;
use crate::ffi::utils::{ForeignObject, SketchStr};
use crate::signature::Sketchable;
use crate::sketch::minhash::MinHash;

pub struct KmersketchMinHash;

impl ForeignObject for KmersketchMinHash {
    type RustObject = MinHash;
}

#[no_mangle]
pub unsafe extern "C" fn minhash_new(
    scaled: u64,
    k: u32,
    hash_function: Molecule,
    seed: u64,
    track_abundance: bool,
    n: u32,
) -> *mut KmersketchMinHash {
    let mh = MinHash::new(scaled, k, hash_function, seed, track_abundance, n);

    KmersketchMinHash::from_rust(mh)
}

#[no_mangle]
pub unsafe extern "C" fn minhash_free(ptr: *mut KmersketchMinHash) {
    KmersketchMinHash::drop(ptr);
}

#[no_mangle]
pub unsafe extern "C" fn minhash_slice_free(ptr: *mut u64, insize: usize) {
    if ptr.is_null() {
        return;
    }
    drop(Vec::from_raw_parts(ptr, insize, insize));
}

ffi_fn! {
unsafe fn minhash_add_sequence(ptr: *mut KmersketchMinHash, sequence: *const c_char, force: bool) ->
    Result<()> {
    let mh = KmersketchMinHash::as_rust_mut(ptr);
    let c_str = {
        assert!(!sequence.is_null());

        CStr::from_ptr(sequence)
    };

    mh.add_sequence(c_str.to_bytes(), force)
}
}

ffi_fn! {
unsafe fn minhash_add_protein(ptr: *mut KmersketchMinHash, sequence: *const c_char) ->
    Result<()> {
    let mh = KmersketchMinHash::as_rust_mut(ptr);
    let c_str = {
        assert!(!sequence.is_null());

        CStr::from_ptr(sequence)
    };

    mh.add_protein(c_str.to_bytes())
}
}

#[no_mangle]
pub unsafe extern "C" fn minhash_clear(ptr: *mut KmersketchMinHash) {
    let mh = KmersketchMinHash::as_rust_mut(ptr);

    mh.clear();
}

#[no_mangle]
pub unsafe extern "C" fn minhash_add_hash(ptr: *mut KmersketchMinHash, h: u64) {
    let mh = KmersketchMinHash::as_rust_mut(ptr);

    mh.add_hash(h);
}

#[no_mangle]
pub unsafe extern "C" fn minhash_add_hash_with_abundance(
    ptr: *mut KmersketchMinHash,
    h: u64,
    abundance: u64,
) {
    let mh = KmersketchMinHash::as_rust_mut(ptr);

    mh.add_hash_with_abundance(h, abundance);
}

#[no_mangle]
pub unsafe extern "C" fn minhash_add_word(ptr: *mut KmersketchMinHash, word: *const c_char) {
    let mh = KmersketchMinHash::as_rust_mut(ptr);
    let c_str = {
        assert!(!word.is_null());

        CStr::from_ptr(word)
    };

    mh.add_word(c_str.to_bytes());
}

#[no_mangle]
pub unsafe extern "C" fn minhash_remove_hash(ptr: *mut KmersketchMinHash, h: u64) {
    let mh = KmersketchMinHash::as_rust_mut(ptr);

    mh.remove_hash(h);
}

ffi_fn! {
unsafe fn minhash_remove_many(
    ptr: *mut KmersketchMinHash,
    hashes_ptr: *const u64,
    insize: usize,
  ) -> Result<()> {
    let mh = KmersketchMinHash::as_rust_mut(ptr);
    let hashes = {
        assert!(!hashes_ptr.is_null());
        slice::from_raw_parts(hashes_ptr, insize)
    };

    mh.remove_many(hashes)
}
}

ffi_fn! {
unsafe fn minhash_add_many(
    ptr: *mut KmersketchMinHash,
    hashes_ptr: *const u64,
    insize: usize,
  ) -> Result<()> {
    let mh = KmersketchMinHash::as_rust_mut(ptr);
    let hashes = {
        assert!(!hashes_ptr.is_null());
        slice::from_raw_parts(hashes_ptr, insize)
    };

    mh.add_many(hashes)
}
}

ffi_fn! {
unsafe fn minhash_set_abundances(
    ptr: *mut KmersketchMinHash,
    hashes_ptr: *const u64,
    abunds_ptr: *const u64,
    insize: usize,
    clear: bool,
) -> Result<()> {
    let mh = KmersketchMinHash::as_rust_mut(ptr);
    let hashes = {
        assert!(!hashes_ptr.is_null());
        slice::from_raw_parts(hashes_ptr, insize)
    };
    let abunds = {
        assert!(!abunds_ptr.is_null());
        slice::from_raw_parts(abunds_ptr, insize)
    };

    let pairs: Vec<_> = hashes.iter().cloned().zip(abunds.iter().cloned()).collect();
    mh.set_abundances(&pairs, clear)
}
}

ffi_fn! {
unsafe fn minhash_get_mins(ptr: *const KmersketchMinHash, size: *mut usize) -> Result<*const u64> {
    let mh = KmersketchMinHash::as_rust(ptr);
    let output = mh.mins();
    *size = output.len();

    Ok(Box::into_raw(output.into_boxed_slice()) as *const u64)
}
}

ffi_fn! {
unsafe fn minhash_get_abunds(ptr: *const KmersketchMinHash, size: *mut usize) -> Result<*const u64> {
    let mh = KmersketchMinHash::as_rust(ptr);

    if let Some(abunds) = mh.abunds() {
        *size = abunds.len();
        Ok(Box::into_raw(abunds.into_boxed_slice()) as *const u64)
    } else {
        *size = 0;
        Ok(std::ptr::null())
    }
}
}

#[no_mangle]
pub unsafe extern "C" fn minhash_get_mins_size(ptr: *const KmersketchMinHash) -> usize {
    let mh = KmersketchMinHash::as_rust(ptr);

    mh.size()
}

ffi_fn! {
unsafe fn minhash_md5sum(ptr: *const KmersketchMinHash) -> Result<SketchStr> {
    let mh = KmersketchMinHash::as_rust(ptr);

    Ok(mh.md5sum().into())
}
}

#[no_mangle]
pub unsafe extern "C" fn minhash_is_protein(ptr: *const KmersketchMinHash) -> bool {
    let mh = KmersketchMinHash::as_rust(ptr);

    mh.is_protein()
}

#[no_mangle]
pub unsafe extern "C" fn minhash_dayhoff(ptr: *const KmersketchMinHash) -> bool {
    let mh = KmersketchMinHash::as_rust(ptr);

    mh.dayhoff()
}

#[no_mangle]
pub unsafe extern "C" fn minhash_hp(ptr: *const KmersketchMinHash) -> bool {
    let mh = KmersketchMinHash::as_rust(ptr);

    mh.hp()
}

#[no_mangle]
pub unsafe extern "C" fn minhash_seed(ptr: *const KmersketchMinHash) -> u64 {
    let mh = KmersketchMinHash::as_rust(ptr);

    mh.seed()
}

#[no_mangle]
pub unsafe extern "C" fn minhash_num(ptr: *const KmersketchMinHash) -> u32 {
    let mh = KmersketchMinHash::as_rust(ptr);

    mh.num()
}

#[no_mangle]
pub unsafe extern "C" fn minhash_ksize(ptr: *const KmersketchMinHash) -> u32 {
    let mh = KmersketchMinHash::as_rust(ptr);

    mh.ksize() as u32
}

#[no_mangle]
pub unsafe extern "C" fn minhash_max_hash(ptr: *const KmersketchMinHash) -> u64 {
    let mh = KmersketchMinHash::as_rust(ptr);

    mh.max_hash()
}

#[no_mangle]
pub unsafe extern "C" fn minhash_scaled(ptr: *const KmersketchMinHash) -> u64 {
    let mh = KmersketchMinHash::as_rust(ptr);

    mh.scaled()
}

#[no_mangle]
pub unsafe extern "C" fn minhash_is_empty(ptr: *const KmersketchMinHash) -> bool {
    let mh = KmersketchMinHash::as_rust(ptr);

    mh.is_empty()
}

#[no_mangle]
pub unsafe extern "C" fn minhash_track_abundance(ptr: *const KmersketchMinHash) -> bool {
    let mh = KmersketchMinHash::as_rust(ptr);

    mh.track_abundance()
}

ffi_fn! {
unsafe fn minhash_enable_abundance(ptr: *mut KmersketchMinHash) -> Result<()> {
    let mh = KmersketchMinHash::as_rust_mut(ptr);

    mh.enable_abundance()
}
}

#[no_mangle]
pub unsafe extern "C" fn minhash_disable_abundance(ptr: *mut KmersketchMinHash) {
    let mh = KmersketchMinHash::as_rust_mut(ptr);

    mh.disable_abundance();
}

#[no_mangle]
pub unsafe extern "C" fn minhash_hash_function(ptr: *const KmersketchMinHash) -> Molecule {
    let mh = KmersketchMinHash::as_rust(ptr);

    mh.molecule()
}

ffi_fn! {
unsafe fn minhash_hash_function_set(ptr: *mut KmersketchMinHash, hash_function: Molecule) -> Result<()> {
    let mh = KmersketchMinHash::as_rust_mut(ptr);

    mh.set_molecule(hash_function)
}
}

ffi_fn! {
unsafe fn minhash_merge(ptr: *mut KmersketchMinHash, optr: *const KmersketchMinHash) -> Result<()> {
    let mh = KmersketchMinHash::as_rust_mut(ptr);
    let other_mh = KmersketchMinHash::as_rust(optr);

    mh.merge(other_mh)
}
}

ffi_fn! {
unsafe fn minhash_add_from(ptr: *mut KmersketchMinHash, optr: *const KmersketchMinHash) -> Result<()> {
    let mh = KmersketchMinHash::as_rust_mut(ptr);
    let other_mh = KmersketchMinHash::as_rust(optr);

    mh.add_from(other_mh)
}
}

ffi_fn! {
unsafe fn minhash_remove_from(ptr: *mut KmersketchMinHash, optr: *const KmersketchMinHash) -> Result<()> {
    let mh = KmersketchMinHash::as_rust_mut(ptr);
    let other_mh = KmersketchMinHash::as_rust(optr);

    mh.remove_from(other_mh)
}
}

#[no_mangle]
pub unsafe extern "C" fn minhash_is_compatible(
    ptr: *const KmersketchMinHash,
    optr: *const KmersketchMinHash,
) -> bool {
    let mh = KmersketchMinHash::as_rust(ptr);
    let other_mh = KmersketchMinHash::as_rust(optr);

    mh.check_compatible(other_mh).is_ok()
}

ffi_fn! {
unsafe fn minhash_count_common(ptr: *const KmersketchMinHash, optr: *const KmersketchMinHash, downsample: bool) -> Result<u64> {
    let mh = KmersketchMinHash::as_rust(ptr);
    let other_mh = KmersketchMinHash::as_rust(optr);

    mh.count_common(other_mh, downsample)
}
}

ffi_fn! {
unsafe fn minhash_intersection(ptr: *const KmersketchMinHash, optr: *const KmersketchMinHash) -> Result<*mut KmersketchMinHash> {
    let mh = KmersketchMinHash::as_rust(ptr);
    let other_mh = KmersketchMinHash::as_rust(optr);

    let common = mh.intersection(other_mh)?;
    Ok(KmersketchMinHash::from_rust(common))
}
}

ffi_fn! {
unsafe fn minhash_intersection_union_size(
    ptr: *const KmersketchMinHash,
    optr: *const KmersketchMinHash,
    union_size: *mut u64,
) -> Result<u64> {
    let mh = KmersketchMinHash::as_rust(ptr);
    let other_mh = KmersketchMinHash::as_rust(optr);

    let (common, union) = mh.intersection_size(other_mh)?;
    *union_size = union;
    Ok(common)
}
}

ffi_fn! {
unsafe fn minhash_jaccard(ptr: *const KmersketchMinHash, optr: *const KmersketchMinHash) -> Result<f64> {
    let mh = KmersketchMinHash::as_rust(ptr);
    let other_mh = KmersketchMinHash::as_rust(optr);

    mh.jaccard(other_mh)
}
}

ffi_fn! {
unsafe fn minhash_angular_similarity(ptr: *const KmersketchMinHash, optr: *const KmersketchMinHash) -> Result<f64> {
    let mh = KmersketchMinHash::as_rust(ptr);
    let other_mh = KmersketchMinHash::as_rust(optr);

    mh.angular_similarity(other_mh)
}
}

ffi_fn! {
unsafe fn minhash_similarity(
    ptr: *const KmersketchMinHash,
    optr: *const KmersketchMinHash,
    ignore_abundance: bool,
    downsample: bool,
) -> Result<f64> {
    let mh = KmersketchMinHash::as_rust(ptr);
    let other_mh = KmersketchMinHash::as_rust(optr);

    mh.similarity(other_mh, ignore_abundance, downsample)
}
}

ffi_fn! {
unsafe fn minhash_downsample_max_hash(ptr: *const KmersketchMinHash, max_hash: u64) -> Result<*mut KmersketchMinHash> {
    let mh = KmersketchMinHash::as_rust(ptr);

    let downsampled = mh.downsample_max_hash(max_hash)?;
    Ok(KmersketchMinHash::from_rust(downsampled))
}
}

ffi_fn! {
unsafe fn minhash_downsample_scaled(ptr: *const KmersketchMinHash, scaled: u64) -> Result<*mut KmersketchMinHash> {
    let mh = KmersketchMinHash::as_rust(ptr);

    let downsampled = mh.downsample_scaled(scaled)?;
    Ok(KmersketchMinHash::from_rust(downsampled))
}
}

ffi_fn! {
unsafe fn minhash_downsample_num(ptr: *const KmersketchMinHash, num: u32) -> Result<*mut KmersketchMinHash> {
    let mh = KmersketchMinHash::as_rust(ptr);

    let downsampled = mh.downsample_num(num)?;
    Ok(KmersketchMinHash::from_rust(downsampled))
}
}
