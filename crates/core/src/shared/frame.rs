/// A single captured frame: contiguous pixel bytes in row-major order.
///
/// The monitor never inspects pixels itself; frames are handed to the
/// landmark provider as-is. The pixel accessors are the seam a
/// camera-backed source and detector share. Replayed frames carry no pixel
/// data, and their provider keys on [`Frame::index`] alone.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    /// A zero-sized frame that only carries its position in the stream.
    pub fn placeholder(index: usize) -> Self {
        Self::new(Vec::new(), 0, 0, 0, index)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_placeholder(&self) -> bool {
        self.data.is_empty()
    }
}
