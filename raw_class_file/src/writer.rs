use std::io::{Error, ErrorKind, Result, Write};

pub(crate) trait ClassWrite {
	fn write_u8(&mut self, value: u8) -> Result<()> {
		self.write_u8_slice(&[value])
	}
	fn write_u16(&mut self, value: u16) -> Result<()> {
		self.write_u8_slice(&value.to_be_bytes())
	}
	fn write_u32(&mut self, value: u32) -> Result<()> {
		self.write_u8_slice(&value.to_be_bytes())
	}
	fn write_u64(&mut self, value: u64) -> Result<()> {
		self.write_u8_slice(&value.to_be_bytes())
	}
	fn write_i32(&mut self, value: i32) -> Result<()> {
		self.write_u8_slice(&value.to_be_bytes())
	}
	fn write_i64(&mut self, value: i64) -> Result<()> {
		self.write_u8_slice(&value.to_be_bytes())
	}

	fn write_usize_as_u16(&mut self, value: usize) -> Result<()> {
		let value = u16::try_from(value)
			.map_err(|_| Error::new(ErrorKind::InvalidInput, format!("failed to convert {value} to u16 for writing: value too large")))?;
		self.write_u16(value)
	}
	fn write_usize_as_u32(&mut self, value: usize) -> Result<()> {
		let value = u32::try_from(value)
			.map_err(|_| Error::new(ErrorKind::InvalidInput, format!("failed to convert {value} to u32 for writing: value too large")))?;
		self.write_u32(value)
	}

	fn write_u8_slice(&mut self, buf: &[u8]) -> Result<()>;

	fn write_slice<T>(
		&mut self,
		slice: &[T],
		put_size: impl FnOnce(&mut Self, usize) -> Result<()>,
		mut put_element: impl FnMut(&mut Self, &T) -> Result<()>
	) -> Result<()> {
		put_size(self, slice.len())?;
		for value in slice {
			put_element(self, value)?;
		}
		Ok(())
	}
}

impl<W: Write + ?Sized> ClassWrite for W {
	fn write_u8_slice(&mut self, buf: &[u8]) -> Result<()> {
		self.write_all(buf)
	}
}
