fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    #[cfg(feature = "embedded-shaders")]
    embedded::compile();
}

#[cfg(feature = "embedded-shaders")]
mod embedded {
    use std::{env, fs, path::PathBuf};

    pub fn compile() {
        let out = PathBuf::from(env::var("OUT_DIR").unwrap());
        let comp = shaderc::Compiler::new().unwrap();
        let mut opts = shaderc::CompileOptions::new().unwrap();
        opts.set_target_env(shaderc::TargetEnv::Vulkan, shaderc::EnvVersion::Vulkan1_0 as u32);
        opts.set_optimization_level(shaderc::OptimizationLevel::Performance);

        for (file, kind, artifact) in [
            ("triangle.vert", shaderc::ShaderKind::Vertex, "vert.spv"),
            ("triangle.frag", shaderc::ShaderKind::Fragment, "frag.spv"),
        ] {
            let path = format!("shaders/{file}");
            println!("cargo:rerun-if-changed={path}");
            let src = fs::read_to_string(&path).unwrap();
            let spv = comp
                .compile_into_spirv(&src, kind, file, "main", Some(&opts))
                .unwrap();
            fs::write(out.join(artifact), spv.as_binary_u8()).unwrap();
        }
    }
}
