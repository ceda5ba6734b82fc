//! Schema fixtures shared by the codegen tests.

use handlegen_schema::{SchemaModel, parse_schema};

/// A three-level nesting (`VkTop` > `VkMiddle` > `VkLeaf`), an extension
/// chain on `VkTop` with two handle-bearing extensions, one extension
/// without handles and one alias, plus commands and enums.
pub const TRAVERSAL_SCHEMA: &str = r#"<registry name="vulkan">
    <types>
        <type name="void"/>
        <type name="uint32_t"/>
        <type name="uint64_t"/>
        <type name="VkDevice" category="handle"/>
        <type name="VkCommandBuffer" category="handle"/>
        <type name="VkBuffer" category="handle"/>
        <type name="VkImage" category="handle"/>
        <type name="VkSemaphore" category="handle"/>
        <type name="VkBufferKHR" category="handle" alias="VkBuffer"/>
        <enum name="VkStructureType"/>
        <enum name="VkObjectType"/>
        <enum name="VkResult"/>
        <enum name="VkFormat"/>
        <enum name="VkAccessFlagBits"/>
        <enum name="VkAccessFlagBitsKHR" alias="VkAccessFlagBits"/>
        <enum name="VkAccessFlagBits2" bitwidth="64"/>
        <struct name="VkLeaf">
            <member name="buffer" type="VkBuffer"/>
        </struct>
        <struct name="VkMiddle">
            <member name="leafCount" type="uint32_t"/>
            <member name="pLeaves" type="VkLeaf" cardinality="pointer" len="leafCount"/>
            <member name="image" type="VkImage"/>
        </struct>
        <struct name="VkTop" tag="VK_STRUCTURE_TYPE_TOP">
            <member name="sType" type="VkStructureType"/>
            <member name="pNext" type="void" cardinality="pointer" chain="true"/>
            <member name="middle" type="VkMiddle"/>
            <member name="semaphores" type="VkSemaphore" length="2"/>
            <member name="imageCount" type="uint32_t"/>
            <member name="pImages" type="VkImage" cardinality="pointer" len="imageCount"/>
        </struct>
        <struct name="VkTopImageExt" tag="VK_STRUCTURE_TYPE_TOP_IMAGE_EXT" structextends="VkTop">
            <member name="sType" type="VkStructureType"/>
            <member name="pNext" type="void" cardinality="pointer" chain="true"/>
            <member name="image" type="VkImage"/>
        </struct>
        <struct name="VkTopImageExtKHR" alias="VkTopImageExt" structextends="VkTop"/>
        <struct name="VkTopBufferExt" tag="VK_STRUCTURE_TYPE_TOP_BUFFER_EXT" structextends="VkTop">
            <member name="sType" type="VkStructureType"/>
            <member name="pNext" type="void" cardinality="pointer" chain="true"/>
            <member name="pBuffer" type="VkBufferKHR" cardinality="pointer"/>
        </struct>
        <struct name="VkTopPlainExt" tag="VK_STRUCTURE_TYPE_TOP_PLAIN_EXT" structextends="VkTop">
            <member name="sType" type="VkStructureType"/>
            <member name="value" type="uint32_t"/>
        </struct>
        <struct name="VkFixedOnly">
            <member name="buffers" type="VkBuffer" length="2"/>
        </struct>
        <struct name="VkNameInfo">
            <member name="objectType" type="VkObjectType"/>
            <member name="objectHandle" type="uint64_t" generic="objectType"/>
        </struct>
        <struct name="VkCreated">
            <member name="bufferCount" type="uint32_t"/>
            <member name="pBuffers" type="VkBuffer" cardinality="pointer" len="bufferCount"/>
        </struct>
        <struct name="VkNoHandles">
            <member name="format" type="VkFormat"/>
        </struct>
    </types>
    <commands>
        <command name="vkCreateImage" return="VkResult">
            <param name="device" type="VkDevice"/>
            <param name="pCreateInfo" type="VkTop" cardinality="pointer" const="true"/>
            <param name="pImage" type="VkImage" cardinality="pointer"/>
        </command>
        <command name="vkCmdBindBuffers">
            <param name="commandBuffer" type="VkCommandBuffer"/>
            <param name="bufferCount" type="uint32_t"/>
            <param name="pBuffers" type="VkBuffer" cardinality="pointer" len="bufferCount" const="true"/>
            <param name="pUserData" type="void" cardinality="pointer"/>
        </command>
        <command name="vkCmdDenied">
            <param name="commandBuffer" type="VkCommandBuffer"/>
        </command>
    </commands>
</registry>"#;

/// A struct holding a nested handle-bearing struct by value and as a fixed
/// array of three.
pub const NESTED_ARRAY_SCHEMA: &str = r#"<registry name="vulkan">
    <types>
        <type name="VkBuffer" category="handle"/>
        <struct name="VkPart">
            <member name="buffer" type="VkBuffer"/>
        </struct>
        <struct name="VkAssembly">
            <member name="nested" type="VkPart"/>
            <member name="arr" type="VkPart" cardinality="fixed" length="3"/>
        </struct>
    </types>
</registry>"#;

/// Builds a model from an XML fixture.
pub fn model(xml: &str) -> SchemaModel {
    let schema = parse_schema(xml).expect("Failed to parse fixture");
    SchemaModel::from_schema(&schema).expect("Failed to build model")
}

/// Builds the traversal fixture model.
pub fn traversal_model() -> SchemaModel {
    model(TRAVERSAL_SCHEMA)
}

/// Builds the nested fixed array fixture model.
pub fn nested_array_model() -> SchemaModel {
    model(NESTED_ARRAY_SCHEMA)
}
