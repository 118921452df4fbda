use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::debug;
use opencv::core::{Mat, Vector};
use opencv::imgcodecs;
use opencv::prelude::*;

/// 解码后的 BGR 三通道图像，只在单次请求内使用
#[derive(Debug)]
pub struct DecodedImage(Mat);

impl DecodedImage {
    /// 包装一张三通道图像，空图像或通道数不对时返回 `None`
    pub fn new(mat: Mat) -> Option<Self> {
        if mat.empty() || mat.channels() != 3 {
            return None;
        }
        Some(Self(mat))
    }

    pub fn mat(&self) -> &Mat {
        &self.0
    }

    /// 图像尺寸 `(宽, 高)`
    pub fn size(&self) -> (i32, i32) {
        (self.0.cols(), self.0.rows())
    }
}

/// 去掉 data URL 前缀，只在第一个逗号处分割
pub fn strip_data_url(payload: &str) -> &str {
    match payload.split_once(',') {
        Some((_, data)) => data,
        None => payload,
    }
}

/// 解码 base64 图片，可以带有 `data:image/png;base64,` 之类的前缀
///
/// 任何失败（base64 格式错误、不是图片）都返回 `None`，不会报错
pub fn decode_base64_image(payload: &str) -> Option<DecodedImage> {
    let data: String = strip_data_url(payload)
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    match STANDARD.decode(data.as_bytes()) {
        Ok(bytes) => decode_image_bytes(&bytes),
        Err(e) => {
            debug!("base64 解码失败: {e}");
            None
        }
    }
}

/// 将图片文件内容解码为彩色图像
pub fn decode_image_bytes(bytes: &[u8]) -> Option<DecodedImage> {
    if bytes.is_empty() {
        return None;
    }
    let buf = Vector::<u8>::from_slice(bytes);
    match imgcodecs::imdecode(&buf, imgcodecs::IMREAD_COLOR) {
        Ok(mat) => {
            let image = DecodedImage::new(mat);
            if image.is_none() {
                debug!("无法识别的图片格式，共 {} 字节", bytes.len());
            }
            image
        }
        Err(e) => {
            debug!("图片解码失败: {e}");
            None
        }
    }
}
