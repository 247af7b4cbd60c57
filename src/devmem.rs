//! Direct /dev/mem access for the lightweight bridge window
//!
//! Provides safe(r) wrappers around mmap for accessing FPGA peripheral
//! registers from userspace.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::Path;

use crate::bank::{word_in_bounds, RegisterBank};
use crate::error::FpgaError;

/// Physical memory device
pub const DEV_MEM: &str = "/dev/mem";

/// Memory-mapped region for hardware access
///
/// Owns both the device descriptor and the mapping. The mapping is released
/// by [`DevMem::unmap`], or best-effort on drop.
pub struct DevMem {
    ptr: *mut u8,
    size: usize,
    base_addr: usize,
    map_ptr: *mut libc::c_void,
    map_size: usize,
    file: Option<File>,
}

// Safety: DevMem only provides &self methods that use volatile reads/writes
// The underlying memory is hardware registers, not shared with other threads
unsafe impl Send for DevMem {}
unsafe impl Sync for DevMem {}

impl DevMem {
    /// Map `size` bytes of physical memory at `base_addr` through /dev/mem
    pub fn new(base_addr: usize, size: usize) -> Result<Self, FpgaError> {
        Self::open(DEV_MEM, base_addr, size)
    }

    /// Map `size` bytes at `base_addr` of an arbitrary device or file
    ///
    /// The descriptor is opened read/write with `O_SYNC`. If the mapping
    /// fails the descriptor is closed before returning.
    pub fn open(path: impl AsRef<Path>, base_addr: usize, size: usize) -> Result<Self, FpgaError> {
        let path = path.as_ref();
        if base_addr % 4 != 0 {
            return Err(FpgaError::Config(format!("base address 0x{:08X} is not word-aligned", base_addr)));
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_SYNC)
            .open(path)
            .map_err(|e| {
                tracing::error!("Couldn't open {}: {}", path.display(), e);
                FpgaError::DeviceOpen(e)
            })?;

        let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) as usize };
        let page_offset = base_addr % page_size;
        let map_base = base_addr - page_offset;
        let map_size = size + page_offset;

        let map_ptr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                map_size,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                file.as_raw_fd(),
                map_base as libc::off_t,
            )
        };

        if map_ptr == libc::MAP_FAILED {
            let e = io::Error::last_os_error();
            tracing::error!("Couldn't map {} at 0x{:08X}: {}", path.display(), base_addr, e);
            // `file` drops here, closing the descriptor exactly once
            return Err(FpgaError::Mmap(e));
        }

        // Adjust pointer to account for page alignment
        let ptr = unsafe { (map_ptr as *mut u8).add(page_offset) };

        Ok(Self {
            ptr,
            size,
            base_addr,
            map_ptr,
            map_size,
            file: Some(file),
        })
    }

    /// Get the base address
    pub fn base_addr(&self) -> usize {
        self.base_addr
    }

    /// Release the mapping and close the descriptor
    ///
    /// The descriptor is closed even when `munmap` fails; the unmap error is
    /// still reported.
    pub fn unmap(mut self) -> Result<(), FpgaError> {
        self.release().map_err(|e| {
            tracing::error!("Couldn't munmap window at 0x{:08X}: {}", self.base_addr, e);
            FpgaError::Unmap(e)
        })
    }

    fn release(&mut self) -> io::Result<()> {
        if self.map_ptr.is_null() {
            return Ok(());
        }

        let rc = unsafe { libc::munmap(self.map_ptr, self.map_size) };
        let result = if rc != 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(())
        };

        self.map_ptr = std::ptr::null_mut();
        self.ptr = std::ptr::null_mut();
        self.file = None;
        result
    }
}

impl RegisterBank for DevMem {
    /// Read a 32-bit word at byte offset
    #[inline]
    fn read32(&self, offset: usize) -> Option<u32> {
        if self.ptr.is_null() || !word_in_bounds(offset, self.size) {
            return None;
        }
        Some(unsafe { std::ptr::read_volatile(self.ptr.add(offset) as *const u32) })
    }

    /// Write a 32-bit word at byte offset
    #[inline]
    fn write32(&self, offset: usize, value: u32) -> bool {
        if self.ptr.is_null() || !word_in_bounds(offset, self.size) {
            return false;
        }
        unsafe {
            std::ptr::write_volatile(self.ptr.add(offset) as *mut u32, value);
        }
        true
    }

    fn size(&self) -> usize {
        self.size
    }
}

impl Drop for DevMem {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            tracing::warn!("munmap failed while dropping window at 0x{:08X}: {}", self.base_addr, e);
        }
    }
}
