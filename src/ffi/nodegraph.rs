use std::ffi::CStr;
use std::io;
use std::os::raw::c_char;
use std::slice;

use crate::ffi::minhash::KmersketchMinHash;
use crate::ffi::utils::ForeignObject;
use crate::sketch::nodegraph::Nodegraph;

pub struct KmersketchNodegraph;

impl ForeignObject for KmersketchNodegraph {
    type RustObject = Nodegraph;
}

ffi_fn! {
unsafe fn nodegraph_new(tablesizes_ptr: *const usize, insize: usize, ksize: usize) -> Result<*mut KmersketchNodegraph> {
    let tablesizes = {
        assert!(!tablesizes_ptr.is_null());
        slice::from_raw_parts(tablesizes_ptr, insize)
    };

    Ok(KmersketchNodegraph::from_rust(Nodegraph::new(tablesizes, ksize)))
}
}

#[no_mangle]
pub unsafe extern "C" fn nodegraph_with_tables(
    tablesize: usize,
    n_tables: usize,
    ksize: usize,
) -> *mut KmersketchNodegraph {
    KmersketchNodegraph::from_rust(Nodegraph::with_tables(tablesize, n_tables, ksize))
}

#[no_mangle]
pub unsafe extern "C" fn nodegraph_free(ptr: *mut KmersketchNodegraph) {
    KmersketchNodegraph::drop(ptr);
}

#[no_mangle]
pub unsafe extern "C" fn nodegraph_count(ptr: *mut KmersketchNodegraph, h: u64) -> bool {
    let ng = KmersketchNodegraph::as_rust_mut(ptr);

    ng.count(h)
}

#[no_mangle]
pub unsafe extern "C" fn nodegraph_get(ptr: *const KmersketchNodegraph, h: u64) -> usize {
    let ng = KmersketchNodegraph::as_rust(ptr);

    ng.get(h)
}

#[no_mangle]
pub unsafe extern "C" fn nodegraph_expected_collisions(ptr: *const KmersketchNodegraph) -> f64 {
    let ng = KmersketchNodegraph::as_rust(ptr);

    ng.expected_collisions()
}

#[no_mangle]
pub unsafe extern "C" fn nodegraph_ksize(ptr: *const KmersketchNodegraph) -> usize {
    let ng = KmersketchNodegraph::as_rust(ptr);

    ng.ksize()
}

#[no_mangle]
pub unsafe extern "C" fn nodegraph_ntables(ptr: *const KmersketchNodegraph) -> usize {
    let ng = KmersketchNodegraph::as_rust(ptr);

    ng.ntables()
}

#[no_mangle]
pub unsafe extern "C" fn nodegraph_noccupied(ptr: *const KmersketchNodegraph) -> usize {
    let ng = KmersketchNodegraph::as_rust(ptr);

    ng.noccupied()
}

ffi_fn! {
unsafe fn nodegraph_hashsizes(ptr: *const KmersketchNodegraph, size: *mut usize) -> Result<*const u64> {
    let ng = KmersketchNodegraph::as_rust(ptr);
    let st = ng.tablesizes();

    let b = st.into_boxed_slice();
    *size = b.len();

    Ok(Box::into_raw(b) as *const u64)
}
}

#[no_mangle]
pub unsafe extern "C" fn nodegraph_matches(
    ptr: *const KmersketchNodegraph,
    mh_ptr: *const KmersketchMinHash,
) -> usize {
    let ng = KmersketchNodegraph::as_rust(ptr);
    let mh = KmersketchMinHash::as_rust(mh_ptr);

    ng.matches(mh)
}

#[no_mangle]
pub unsafe extern "C" fn nodegraph_update_mh(
    ptr: *mut KmersketchNodegraph,
    optr: *const KmersketchMinHash,
) {
    let ng = KmersketchNodegraph::as_rust_mut(ptr);
    let mh = KmersketchMinHash::as_rust(optr);

    ng.update_mh(mh)
}

ffi_fn! {
unsafe fn nodegraph_from_path(filename: *const c_char) -> Result<*mut KmersketchNodegraph> {
    let c_str = {
        assert!(!filename.is_null());

        CStr::from_ptr(filename)
    };

    let ng = Nodegraph::from_path(c_str.to_str()?)?;
    Ok(KmersketchNodegraph::from_rust(ng))
}
}

ffi_fn! {
unsafe fn nodegraph_from_buffer(ptr: *const c_char, insize: usize) -> Result<*mut KmersketchNodegraph> {
    let buf = {
        assert!(!ptr.is_null());
        slice::from_raw_parts(ptr as *mut u8, insize)
    };

    let ng = Nodegraph::from_reader(buf)?;
    Ok(KmersketchNodegraph::from_rust(ng))
}
}

ffi_fn! {
unsafe fn nodegraph_save(ptr: *const KmersketchNodegraph, filename: *const c_char) -> Result<()> {
    let ng = KmersketchNodegraph::as_rust(ptr);
    let c_str = {
        assert!(!filename.is_null());

        CStr::from_ptr(filename)
    };

    ng.save(c_str.to_str()?)?;
    Ok(())
}
}

ffi_fn! {
unsafe fn nodegraph_to_buffer(ptr: *const KmersketchNodegraph, size: *mut usize) -> Result<*const u8> {
    let ng = KmersketchNodegraph::as_rust(ptr);

    let mut buffer = vec![];
    {
        let mut writer = io::BufWriter::new(&mut buffer);
        ng.save_to_writer(&mut writer)?;
    }

    let b = buffer.into_boxed_slice();
    *size = b.len();

    Ok(Box::into_raw(b) as *const u8)
}
}

#[no_mangle]
pub unsafe extern "C" fn nodegraph_buffer_free(ptr: *mut u8, insize: usize) {
    if ptr.is_null() {
        return;
    }
    drop(Vec::from_raw_parts(ptr, insize, insize));
}
