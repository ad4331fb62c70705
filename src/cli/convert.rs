use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};

use sigtree::convert::{ConversionConfig, Converter};
use sigtree::signal::PhysicalLayout;
use sigtree::store::{CompressionType, SIGTREE_EXTENSION};

use super::config::Config;
use super::LayoutArg;

/// Arguments of the convert command
pub struct ConvertArgs {
    pub input: PathBuf,
    pub montage: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub layout: Option<LayoutArg>,
    pub config: Option<PathBuf>,
    pub overwrite: bool,
    pub compression_level: Option<i32>,
}

/// Convert a recording JSON file to one or two sigtree stores
pub fn run(args: ConvertArgs) -> Result<()> {
    if !args.input.exists() {
        anyhow::bail!("Input file does not exist: {}", args.input.display());
    }

    let file_config = match &args.config {
        Some(path) => Config::from_file(path)?.conversion,
        None => Default::default(),
    };
    let layout = args.layout.or(file_config.layout).unwrap_or_default();
    let compression_level = args
        .compression_level
        .or(file_config.compression_level)
        .unwrap_or(3);
    let overwrite = args.overwrite || file_config.overwrite.unwrap_or(false);

    let output = args
        .output
        .unwrap_or_else(|| default_output(&args.input));

    info!("sigtree Converter - recording to sigtree");
    info!("========================================");
    info!("Input:  {}", args.input.display());
    if let Some(montage) = &args.montage {
        info!("Montage: {}", montage.display());
    }
    info!("Layout: {:?}", layout);
    info!("Compression level: {}", compression_level);

    let mut config = ConversionConfig::default().with_overwrite(overwrite);
    config.store.compression = CompressionType::Zstd(compression_level);
    let converter = Converter::with_config(config);

    for &physical in layout.layouts() {
        let target = output_for(&output, layout, physical);
        info!("Output: {}", target.display());

        let report = converter
            .convert_file(&args.input, args.montage.as_deref(), &target, physical)
            .with_context(|| format!("Conversion to {} failed", target.display()))?;

        println!("{}", report.format_colored());
    }

    Ok(())
}

fn default_output(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    input.with_file_name(format!("{}.{}", stem, SIGTREE_EXTENSION))
}

/// Path for one physical layout; the combined store of a dual conversion
/// gets a `-oneda` suffix
fn output_for(output: &Path, requested: LayoutArg, physical: PhysicalLayout) -> PathBuf {
    if requested != LayoutArg::Both || physical != PhysicalLayout::Combined {
        return output.to_path_buf();
    }
    let stem = output.file_stem().unwrap_or_default().to_string_lossy();
    let name = match output.extension() {
        Some(ext) => format!("{}-oneda.{}", stem, ext.to_string_lossy()),
        None => format!("{}-oneda", stem),
    };
    output.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output() {
        assert_eq!(
            default_output(Path::new("/data/sub-01.json")),
            PathBuf::from("/data/sub-01.sigtree")
        );
    }

    #[test]
    fn test_output_for_dual_layout() {
        let output = Path::new("/data/sub-01.sigtree");
        assert_eq!(
            output_for(output, LayoutArg::Both, PhysicalLayout::Split),
            PathBuf::from("/data/sub-01.sigtree")
        );
        assert_eq!(
            output_for(output, LayoutArg::Both, PhysicalLayout::Combined),
            PathBuf::from("/data/sub-01-oneda.sigtree")
        );
        assert_eq!(
            output_for(output, LayoutArg::Combined, PhysicalLayout::Combined),
            PathBuf::from("/data/sub-01.sigtree")
        );
    }
}
