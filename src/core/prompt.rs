use super::settings::{GenerationSettings, LEVEL_MAX};
use super::styles::style_fragment;

const QUALITY_DIRECTIVES: &str = "Apply realistic depth, accurate anatomy, coherent composition, \
style-consistent color grading, and professional visual polish.\n\
Avoid artifacts, distortions, and unnatural textures.\n\
Memory over marketing.";

/// Assemble the text prompt sent alongside any source image
pub fn build_prompt(settings: &GenerationSettings) -> String {
    format!(
        "Create an image in {style} style.\n\
         Visual tone: cinematic lighting level {lighting}/{max}, detail complexity {complexity}/{max}.\n\
         Style characteristics: {fragment}.\n\
         Aspect ratio: {ratio}.\n\
         Image quality: {quality}.\n\
         \n\
         Scene description: {scene}.\n\
         \n\
         {directives}",
        style = settings.style,
        lighting = settings.lighting,
        complexity = settings.complexity,
        max = LEVEL_MAX,
        fragment = style_fragment(settings.style),
        ratio = settings.aspect_ratio,
        quality = settings.quality,
        scene = settings.prompt.trim(),
        directives = QUALITY_DIRECTIVES,
    )
}
