use depositer::integrators::optimal_mis::OPTIMAL_MIS_SENTINEL;
use depositer::io::exr_utils::read_exr_from_file;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <image.exr>", args[0]);
        std::process::exit(1);
    }

    let img = match read_exr_from_file(&args[1]) {
        Ok(img) => img,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let mut min = (f32::INFINITY, f32::INFINITY, f32::INFINITY);
    let mut max = (f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY);
    let mut sum = (0.0f64, 0.0f64, 0.0f64);
    let mut non_finite = 0usize;
    let mut sentinel = 0usize;

    for p in img.pixels() {
        if !p.is_finite() {
            non_finite += 1;
            continue;
        }
        if p.to_array() == OPTIMAL_MIS_SENTINEL {
            sentinel += 1;
        }
        let (r, g, b) = (p.r(), p.g(), p.b());
        if r < min.0 { min.0 = r; }
        if g < min.1 { min.1 = g; }
        if b < min.2 { min.2 = b; }
        if r > max.0 { max.0 = r; }
        if g > max.1 { max.1 = g; }
        if b > max.2 { max.2 = b; }
        sum.0 += r as f64;
        sum.1 += g as f64;
        sum.2 += b as f64;
    }

    let n = (img.pixels().len() - non_finite).max(1) as f64;
    println!("Size: {}x{} ({} pixels)", img.width(), img.height(), img.pixels().len());
    println!("Min RGB: {:.6}, {:.6}, {:.6}", min.0, min.1, min.2);
    println!("Max RGB: {:.6}, {:.6}, {:.6}", max.0, max.1, max.2);
    println!("Mean RGB: {:.6}, {:.6}, {:.6}", sum.0 / n, sum.1 / n, sum.2 / n);
    println!("Non-finite pixels: {}", non_finite);
    println!("MIS sentinel pixels: {}", sentinel);
}
