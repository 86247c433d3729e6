//! 下载链接的二维码渲染
//!
//! 用半块字符输出适合终端显示的二维码，供手机扫码下载。

use anyhow::Result;
use qrcode::QrCode;
use qrcode::render::unicode;

/// 把链接渲染成终端二维码字符串
///
/// 深色终端下反转明暗，扫码器才能识别。
pub fn render_link_qr(link: &str) -> Result<String> {
    let code = QrCode::new(link.as_bytes())?;
    let rendered = code
        .render::<unicode::Dense1x2>()
        .dark_color(unicode::Dense1x2::Light)
        .light_color(unicode::Dense1x2::Dark)
        .build();
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_link_qr() {
        let qr = render_link_qr("http://192.168.1.10:5000/uploads/abc.txt").unwrap();
        assert!(!qr.is_empty());
        // Dense1x2 渲染由全块/半块字符组成
        assert!(qr.chars().any(|c| matches!(c, '█' | '▀' | '▄')));
        assert!(qr.lines().count() > 10);
    }
}
