pub mod frame;
pub mod reassembler;

pub use frame::{frames, Frame};
pub use reassembler::{Ingest, Reassembler, ReassemblerStats, ReassemblyError, ReassemblyEvents};

/// A bus peripheral that hands over one transaction's worth of bytes at a time.
///
/// `receive` resolves once the transaction has completed and returns how many
/// bytes of `buf` were filled. The executor polls the pending transfer, so
/// the control loop never blocks.
#[allow(async_fn_in_trait)]
pub trait ChunkSource {
    type Error;

    async fn receive(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum PumpError<E> {
    Bus(E),
    Reassembly(ReassemblyError),
}

impl<E> From<ReassemblyError> for PumpError<E> {
    fn from(e: ReassemblyError) -> Self {
        Self::Reassembly(e)
    }
}

/// One iteration of the receive loop: wait for a chunk, then ingest it.
pub async fn pump<S, E>(
    source: &mut S,
    buf: &mut [u8],
    reassembler: &mut Reassembler,
    events: &mut E,
) -> Result<Ingest, PumpError<S::Error>>
where
    S: ChunkSource,
    E: ReassemblyEvents + ?Sized,
{
    let received = source.receive(buf).await.map_err(PumpError::Bus)?;
    let chunk = &buf[..received.min(buf.len())];
    Ok(reassembler.ingest(chunk, events)?)
}
