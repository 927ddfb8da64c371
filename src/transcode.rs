//! Streaming base64 transcoding / 流式 base64 编码
//!
//! Encodes a byte stream chunk by chunk. At most two bytes are carried between
//! chunks, padding is only written at the end of the stream.
//! 逐块编码，块之间最多保留2字节，流结束时才补齐

use std::pin::Pin;
use std::task::{Context, Poll};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use futures::Stream;

/// Base64 encoding stream wrapper / base64 编码流包装器
pub struct Base64Stream<S> {
    inner: S,
    /// Bytes left over from the previous chunk (len < 3) / 上一块剩余的字节
    carry: Vec<u8>,
    finished: bool,
}

impl<S> Base64Stream<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            carry: Vec::with_capacity(2),
            finished: false,
        }
    }
}

impl<S, E> Stream for Base64Stream<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
{
    type Item = Result<Bytes, E>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }

        loop {
            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => {
                    let mut buf = std::mem::take(&mut self.carry);
                    buf.extend_from_slice(&chunk);

                    let whole = buf.len() / 3 * 3;
                    self.carry = buf.split_off(whole);
                    if whole == 0 {
                        // Not enough for one quantum yet / 不足3字节，继续读取
                        continue;
                    }
                    return Poll::Ready(Some(Ok(Bytes::from(STANDARD.encode(&buf)))));
                }
                Poll::Ready(Some(Err(e))) => return Poll::Ready(Some(Err(e))),
                Poll::Ready(None) => {
                    self.finished = true;
                    if self.carry.is_empty() {
                        return Poll::Ready(None);
                    }
                    let tail = std::mem::take(&mut self.carry);
                    return Poll::Ready(Some(Ok(Bytes::from(STANDARD.encode(tail)))));
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
